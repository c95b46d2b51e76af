//! Live Region Sink
//!
//! The element assistive technology watches for announcements. Every write
//! replaces the whole content; nothing is appended.

use civic_dom::{Document, NodeId, SharedDocument};

use crate::A11yError;

/// Destination for announcement text
pub trait LiveRegionSink {
    /// Replace the region's content with `message`
    fn write(&mut self, message: &str) -> Result<(), A11yError>;

    /// Empty the region
    fn clear(&mut self) -> Result<(), A11yError>;

    /// Current content, if the region exists
    fn content(&self) -> Option<String>;

    /// False when there is no environment to write into
    fn is_available(&self) -> bool {
        true
    }
}

/// Live region backed by an element in a document.
///
/// The element is created on first write (`<div id=... class="sr-only"
/// aria-live aria-atomic>` under `<body>`) and reused afterwards.
#[derive(Debug)]
pub struct DomLiveRegion {
    document: SharedDocument,
    element_id: String,
}

impl DomLiveRegion {
    /// Assertive, atomic region with the given element id
    pub fn new(document: SharedDocument, element_id: impl Into<String>) -> Self {
        Self {
            document,
            element_id: element_id.into(),
        }
    }

    pub fn element_id(&self) -> &str {
        &self.element_id
    }

    /// Find the region element, creating it if absent
    pub fn ensure_element(&self, doc: &mut Document) -> Result<NodeId, A11yError> {
        if let Some(existing) = doc.get_element_by_id(&self.element_id) {
            return Ok(existing);
        }

        let region = doc.create_element("div");
        doc.set_attribute(region, "id", &self.element_id)?;
        doc.set_attribute(region, "class", "sr-only")?;
        doc.set_attribute(region, "aria-live", "assertive")?;
        doc.set_attribute(region, "aria-atomic", "true")?;
        let body = doc.body();
        doc.append_child(body, region)?;
        tracing::debug!(id = %self.element_id, "created live region");
        Ok(region)
    }
}

impl LiveRegionSink for DomLiveRegion {
    fn write(&mut self, message: &str) -> Result<(), A11yError> {
        let mut doc = self
            .document
            .try_borrow_mut()
            .map_err(|_| A11yError::EnvironmentUnavailable("document is already borrowed".into()))?;
        let region = self.ensure_element(&mut doc)?;
        doc.set_text_content(region, message)?;
        Ok(())
    }

    fn clear(&mut self) -> Result<(), A11yError> {
        let mut doc = self
            .document
            .try_borrow_mut()
            .map_err(|_| A11yError::EnvironmentUnavailable("document is already borrowed".into()))?;
        if let Some(region) = doc.get_element_by_id(&self.element_id) {
            doc.set_text_content(region, "")?;
        }
        Ok(())
    }

    fn content(&self) -> Option<String> {
        let doc = self.document.try_borrow().ok()?;
        let region = doc.get_element_by_id(&self.element_id)?;
        Some(doc.text_content(region))
    }
}

/// In-memory live region that keeps every write
#[derive(Debug, Default)]
pub struct MemoryLiveRegion {
    content: String,
    history: Vec<String>,
}

impl MemoryLiveRegion {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every message written, oldest first
    pub fn history(&self) -> &[String] {
        &self.history
    }
}

impl LiveRegionSink for MemoryLiveRegion {
    fn write(&mut self, message: &str) -> Result<(), A11yError> {
        self.content = message.to_string();
        self.history.push(message.to_string());
        Ok(())
    }

    fn clear(&mut self) -> Result<(), A11yError> {
        self.content.clear();
        Ok(())
    }

    fn content(&self) -> Option<String> {
        Some(self.content.clone())
    }
}

/// Sink for environments without a document
#[derive(Debug, Default, Clone, Copy)]
pub struct NullLiveRegion;

impl LiveRegionSink for NullLiveRegion {
    fn write(&mut self, _message: &str) -> Result<(), A11yError> {
        Ok(())
    }

    fn clear(&mut self) -> Result<(), A11yError> {
        Ok(())
    }

    fn content(&self) -> Option<String> {
        None
    }

    fn is_available(&self) -> bool {
        false
    }
}
