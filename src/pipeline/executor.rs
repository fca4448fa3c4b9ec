//! Pipeline executor: ordered filters over one data container array.
//!
//! Every pass (a preflight or an execution) starts from a fresh copy of the
//! pipeline's initial data and threads that single copy through all filters
//! in order. A pass stops at the first filter that reports a negative error
//! condition. Effects of the filters that ran before it stay in the pass's
//! data, which remains available through
//! [`FilterPipeline::data_container_array`] until the next pass.

use crate::data::DataContainerArray;
use crate::filter::{codes, Filter};
use crate::message::{ObserverSet, PipelineEvent, PipelineMessage, PipelineObserver};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Source name for messages emitted by the pipeline itself
pub const PIPELINE_SOURCE: &str = "FilterPipeline";

pub struct FilterPipeline {
    name: String,
    filters: Vec<Filter>,
    /// Seed copied at the start of every pass
    initial_data: DataContainerArray,
    /// Data of the most recent pass
    data: DataContainerArray,
    observers: ObserverSet,
    error_condition: i32,
    canceled: Arc<AtomicBool>,
}

impl FilterPipeline {
    pub fn new() -> Self {
        Self::with_name("Pipeline")
    }

    pub fn with_name(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            filters: Vec::new(),
            initial_data: DataContainerArray::new(),
            data: DataContainerArray::new(),
            observers: ObserverSet::new(),
            error_condition: 0,
            canceled: Arc::new(AtomicBool::new(false)),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn set_name(&mut self, name: impl Into<String>) {
        self.name = name.into();
    }

    // ── Filter sequence ──

    pub fn push_back(&mut self, filter: impl Into<Filter>) {
        self.filters.push(filter.into());
        self.renumber();
    }

    pub fn push_front(&mut self, filter: impl Into<Filter>) {
        self.filters.insert(0, filter.into());
        self.renumber();
    }

    /// Insert at `index`, or append when `index` is past the end
    pub fn insert(&mut self, index: usize, filter: impl Into<Filter>) {
        let index = index.min(self.filters.len());
        self.filters.insert(index, filter.into());
        self.renumber();
    }

    pub fn remove(&mut self, index: usize) -> Option<Filter> {
        if index >= self.filters.len() {
            return None;
        }
        let filter = self.filters.remove(index);
        self.renumber();
        Some(filter)
    }

    /// Drop every filter. The data of the last pass stays inspectable.
    pub fn clear(&mut self) {
        self.filters.clear();
        self.error_condition = 0;
    }

    pub fn len(&self) -> usize {
        self.filters.len()
    }

    pub fn is_empty(&self) -> bool {
        self.filters.is_empty()
    }

    pub fn filters(&self) -> &[Filter] {
        &self.filters
    }

    pub fn filter(&self, index: usize) -> Option<&Filter> {
        self.filters.get(index)
    }

    pub fn filter_mut(&mut self, index: usize) -> Option<&mut Filter> {
        self.filters.get_mut(index)
    }

    fn renumber(&mut self) {
        for (index, filter) in self.filters.iter_mut().enumerate() {
            filter.set_pipeline_index(index);
        }
    }

    // ── Observers ──

    pub fn add_observer(&mut self, observer: impl PipelineObserver + 'static) {
        self.observers.add(observer);
    }

    pub fn observers_mut(&mut self) -> &mut ObserverSet {
        &mut self.observers
    }

    pub fn set_observers(&mut self, observers: ObserverSet) {
        self.observers = observers;
    }

    // ── Data ──

    /// The data every pass starts from
    pub fn initial_data(&self) -> &DataContainerArray {
        &self.initial_data
    }

    pub fn initial_data_mut(&mut self) -> &mut DataContainerArray {
        &mut self.initial_data
    }

    /// Data produced by the most recent pass
    pub fn data_container_array(&self) -> &DataContainerArray {
        &self.data
    }

    pub fn data_container_array_mut(&mut self) -> &mut DataContainerArray {
        &mut self.data
    }

    /// Install a new seed for future passes and return the previous one
    pub fn replace_data_container_array(&mut self, data: DataContainerArray) -> DataContainerArray {
        self.data = data.clone();
        std::mem::replace(&mut self.initial_data, data)
    }

    // ── Running ──

    /// Error condition of the most recent pass: 0 or the failing filter's code
    pub fn error_condition(&self) -> i32 {
        self.error_condition
    }

    /// Flag that stops a running `execute` before its next filter
    pub fn cancel_handle(&self) -> Arc<AtomicBool> {
        Arc::clone(&self.canceled)
    }

    pub fn cancel(&self) {
        self.canceled.store(true, Ordering::SeqCst);
    }

    fn pipeline_message(&self, message: PipelineMessage) -> PipelineMessage {
        message.with_prefix(self.name.clone())
    }

    /// Run every filter's data check in order; stop at the first failure.
    ///
    /// Returns `true` when the whole chain validated.
    pub fn preflight_pipeline(&mut self) -> bool {
        self.data = self.initial_data.clone();
        self.error_condition = 0;
        tracing::debug!("Preflighting pipeline '{}' ({} filters)", self.name, self.filters.len());

        let mut failed_at = None;
        for (index, filter) in self.filters.iter_mut().enumerate() {
            if failed_at.is_some() {
                filter.reset();
                continue;
            }
            filter.preflight(&mut self.data, &mut self.observers);
            let code = filter.error_condition();
            if code < 0 {
                tracing::error!(
                    "Preflight failed at filter {} '{}' with code {}",
                    index,
                    filter.filter_name(),
                    code
                );
                self.error_condition = code;
                failed_at = Some(index);
            }
        }
        failed_at.is_none()
    }

    /// Preflight, then execute every filter in order.
    ///
    /// Returns 0 on full success, the failing filter's code, the preflight
    /// failure's code, or [`codes::PIPELINE_CANCELED`].
    pub fn execute(&mut self) -> i32 {
        self.canceled.store(false, Ordering::SeqCst);
        tracing::info!("Executing pipeline '{}' ({} filters)", self.name, self.filters.len());

        if !self.preflight_pipeline() {
            let message = self.pipeline_message(PipelineMessage::error(
                PIPELINE_SOURCE,
                &self.name,
                "Preflight failed; nothing was executed",
                self.error_condition,
            ));
            self.observers.notify_message(message);
            return self.finish();
        }

        self.data = self.initial_data.clone();
        let total = self.filters.len();
        for index in 0..total {
            if self.canceled.load(Ordering::SeqCst) {
                tracing::warn!("Pipeline '{}' canceled before filter {}", self.name, index);
                self.error_condition = codes::PIPELINE_CANCELED;
                let message = self.pipeline_message(PipelineMessage::warning(
                    PIPELINE_SOURCE,
                    &self.name,
                    "Pipeline canceled",
                    codes::PIPELINE_CANCELED,
                ));
                self.observers.notify_message(message);
                break;
            }

            let filter = &mut self.filters[index];
            let progress = PipelineMessage::progress(
                PIPELINE_SOURCE,
                &self.name,
                format!("[{}/{}] {}", index + 1, total, filter.human_label()),
                (index * 100 / total) as u8,
            )
            .with_prefix(self.name.clone());
            self.observers.notify_message(progress);

            tracing::debug!("Executing filter {} '{}'", index, filter.filter_name());
            filter.execute(&mut self.data, &mut self.observers);
            let code = filter.error_condition();
            if code < 0 {
                tracing::error!(
                    "Filter {} '{}' failed with code {}",
                    index,
                    filter.filter_name(),
                    code
                );
                self.error_condition = code;
                break;
            }
        }

        if self.error_condition == 0 {
            let message = self.pipeline_message(PipelineMessage::status(
                PIPELINE_SOURCE,
                &self.name,
                "Pipeline complete",
            ));
            self.observers.notify_message(message);
        }
        self.finish()
    }

    fn finish(&mut self) -> i32 {
        tracing::info!(
            "Pipeline '{}' finished with code {}",
            self.name,
            self.error_condition
        );
        self.observers.notify(&PipelineEvent::PipelineFinished {
            error_condition: self.error_condition,
        });
        self.error_condition
    }

    /// Messages recorded on every filter, in pipeline order
    pub fn collect_messages(&self) -> Vec<PipelineMessage> {
        self.filters
            .iter()
            .flat_map(|f| f.messages().iter().cloned())
            .collect()
    }
}

impl Default for FilterPipeline {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for FilterPipeline {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FilterPipeline")
            .field("name", &self.name)
            .field("filters", &self.filters)
            .field("observers", &self.observers)
            .field("error_condition", &self.error_condition)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::{AttributeMatrixType, DataArrayPath};
    use crate::filter::ParameterValue;
    use crate::filters::{CreateDataArray, EmptyFilter, RenameAttributeArray};
    use crate::message::MessageKind;
    use crate::types::ElementType;
    use std::sync::Mutex;

    fn seeded() -> FilterPipeline {
        let mut pipeline = FilterPipeline::with_name("Test");
        pipeline
            .initial_data_mut()
            .create_data_container("DC")
            .unwrap()
            .create_attribute_matrix("AM", &[4], AttributeMatrixType::Cell)
            .unwrap();
        pipeline
    }

    fn create(name: &str, value: &str) -> Filter {
        Filter::new(
            CreateDataArray::new()
                .with_array(DataArrayPath::new("DC", "AM", name), ElementType::Int32)
                .with_value(value),
        )
    }

    #[test]
    fn test_indices_follow_sequence() {
        let mut pipeline = seeded();
        pipeline.push_back(create("A", "1"));
        pipeline.push_back(create("B", "1"));
        pipeline.push_front(create("C", "1"));
        pipeline.insert(99, create("D", "1"));
        assert_eq!(pipeline.len(), 4);
        for (i, filter) in pipeline.filters().iter().enumerate() {
            assert_eq!(filter.pipeline_index(), Some(i));
        }
        let removed = pipeline.remove(0).unwrap();
        assert_eq!(
            removed.parameter("NewArray"),
            Some(ParameterValue::Path(DataArrayPath::new("DC", "AM", "C")))
        );
        assert_eq!(pipeline.filter(0).unwrap().pipeline_index(), Some(0));
        assert!(pipeline.remove(10).is_none());
    }

    #[test]
    fn test_execute_success() {
        let mut pipeline = seeded();
        pipeline.push_back(create("A", "3"));
        pipeline.push_back(RenameAttributeArray::new(DataArrayPath::new("DC", "AM", "A"), "B"));
        assert_eq!(pipeline.execute(), 0);
        let b = pipeline
            .data_container_array()
            .array(&DataArrayPath::new("DC", "AM", "B"))
            .unwrap();
        assert_eq!(b.as_slice::<i32>().unwrap(), &[3; 4]);
        assert!(pipeline.initial_data().array(&DataArrayPath::new("DC", "AM", "A")).is_none());

        // a second run starts from the seed again
        assert_eq!(pipeline.execute(), 0);
    }

    #[test]
    fn test_preflight_failure_executes_nothing() {
        let mut pipeline = seeded();
        pipeline.push_back(create("A", "3"));
        pipeline.push_back(EmptyFilter::unknown("Gone", codes::UNKNOWN_FILTER));
        pipeline.push_back(create("C", "3"));
        assert_eq!(pipeline.execute(), codes::UNKNOWN_FILTER);
        assert!(pipeline.filter(2).unwrap().messages().is_empty());
        let a = pipeline
            .data_container_array()
            .array(&DataArrayPath::new("DC", "AM", "A"))
            .unwrap();
        assert_eq!(a.as_slice::<i32>().unwrap(), &[0; 4]);
    }

    #[test]
    fn test_cancel_between_filters() {
        let mut pipeline = seeded();
        pipeline.push_back(create("A", "1"));
        pipeline.push_back(create("B", "2"));
        let handle = pipeline.cancel_handle();
        pipeline.add_observer(move |event: &PipelineEvent| {
            if let PipelineEvent::FilterExecuted { index: Some(0), .. } = event {
                handle.store(true, Ordering::SeqCst);
            }
        });
        assert_eq!(pipeline.execute(), codes::PIPELINE_CANCELED);
        let data = pipeline.data_container_array();
        assert!(data.contains_array(&DataArrayPath::new("DC", "AM", "A")));
        assert!(!data.contains_array(&DataArrayPath::new("DC", "AM", "B")));
    }

    #[test]
    fn test_progress_and_completion_messages() {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&seen);
        let mut pipeline = seeded();
        pipeline.push_back(create("A", "1"));
        pipeline.add_observer(move |event: &PipelineEvent| {
            if let Some(message) = event.as_message() {
                sink.lock().unwrap().push(message.clone());
            }
        });
        pipeline.execute();
        let seen = seen.lock().unwrap();
        let progress: Vec<_> = seen.iter().filter(|m| m.kind == MessageKind::Progress).collect();
        assert_eq!(progress.len(), 1);
        assert!(progress[0].text.starts_with("[1/1]"));
        assert_eq!(seen.last().unwrap().text, "Pipeline complete");
    }

    #[test]
    fn test_clear_keeps_data() {
        let mut pipeline = seeded();
        pipeline.push_back(create("A", "1"));
        pipeline.execute();
        pipeline.clear();
        assert!(pipeline.is_empty());
        assert!(pipeline
            .data_container_array()
            .contains_array(&DataArrayPath::new("DC", "AM", "A")));
    }
}
