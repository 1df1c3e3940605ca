use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use tracing::{debug, error, info, instrument, warn};

use super::api::{PlanBackend, TranslateRequest};
use super::languages::normalize_code;
use super::page::{ContentTag, View};

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TranslateError {
    #[error("Please select a language.")]
    NoLanguage,
    #[error("A translation is already in progress.")]
    Busy,
    #[error("Translation failed: {0}")]
    Request(String),
    #[error("Translation failed: expected {expected} translations, got {got}.")]
    LengthMismatch { expected: usize, got: usize },
    #[error("Translation discarded: the page changed while translating.")]
    PageChanged,
}

/// Re-enables the trigger and hides the indicator when dropped.
struct InFlight<'a, V: View> {
    view: &'a Mutex<V>,
    busy: &'a AtomicBool,
}

impl<'a, V: View> InFlight<'a, V> {
    fn begin(view: &'a Mutex<V>, busy: &'a AtomicBool) -> Option<Self> {
        if busy.swap(true, Ordering::SeqCst) {
            return None;
        }
        lock(view).set_translating(true);
        Some(Self { view, busy })
    }
}

impl<V: View> Drop for InFlight<'_, V> {
    fn drop(&mut self) {
        lock(self.view).set_translating(false);
        self.busy.store(false, Ordering::SeqCst);
        debug!("translation controls restored");
    }
}

fn lock<V>(view: &Mutex<V>) -> MutexGuard<'_, V> {
    view.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Translates the visible page text in one batch.
pub struct TranslateController<V> {
    backend: Arc<dyn PlanBackend>,
    view: Arc<Mutex<V>>,
    tags: &'static [ContentTag],
    busy: AtomicBool,
}

impl<V: View> TranslateController<V> {
    pub fn new(backend: Arc<dyn PlanBackend>, view: Arc<Mutex<V>>) -> Self {
        Self {
            backend,
            view,
            tags: ContentTag::TRANSLATABLE,
            busy: AtomicBool::new(false),
        }
    }

    /// Restricts which elements are collected.
    pub fn with_tags(mut self, tags: &'static [ContentTag]) -> Self {
        self.tags = tags;
        self
    }

    fn capture(&self) -> Vec<String> {
        lock(&self.view)
            .text_slots()
            .into_iter()
            .filter(|s| self.tags.contains(&s.tag()))
            .map(|s| s.text().to_string())
            .collect()
    }

    /// Writes `translations` back only if the page still shows `captured`.
    fn apply(&self, captured: &[String], translations: Vec<String>) -> Result<(), TranslateError> {
        let mut view = lock(&self.view);
        let slots: Vec<_> = view
            .text_slots()
            .into_iter()
            .filter(|s| self.tags.contains(&s.tag()))
            .collect();
        let unchanged = slots.len() == captured.len()
            && slots.iter().zip(captured).all(|(slot, text)| slot.text() == text);
        if !unchanged {
            return Err(TranslateError::PageChanged);
        }
        for (mut slot, text) in slots.into_iter().zip(translations) {
            slot.set(text);
        }
        Ok(())
    }

    /// Runs one translation; returns the number of elements rewritten.
    #[instrument(skip(self))]
    pub async fn translate(&self) -> Result<usize, TranslateError> {
        let result = self.run().await;
        if let Err(e) = &result {
            match e {
                TranslateError::Busy => debug!("translation already running; trigger ignored"),
                TranslateError::LengthMismatch { .. } | TranslateError::PageChanged => {
                    error!(error = %e, "translation misaligned")
                }
                _ => warn!(error = %e, "translation not applied"),
            }
            if *e != TranslateError::Busy {
                lock(&self.view).alert(&e.to_string());
            }
        }
        result
    }

    async fn run(&self) -> Result<usize, TranslateError> {
        let selected = lock(&self.view).selected_language();
        let target = selected
            .as_deref()
            .and_then(normalize_code)
            .ok_or(TranslateError::NoLanguage)?;

        let _guard = InFlight::begin(&self.view, &self.busy).ok_or(TranslateError::Busy)?;

        let texts = self.capture();
        let expected = texts.len();
        debug!(lang = target, texts = expected, "requesting translation");

        let req = TranslateRequest {
            q: texts.clone(),
            target: target.to_string(),
        };
        let res = self
            .backend
            .translate(&req)
            .await
            .map_err(|e| TranslateError::Request(e.user_message()))?;

        if res.translations.len() != expected {
            return Err(TranslateError::LengthMismatch {
                expected,
                got: res.translations.len(),
            });
        }

        self.apply(&texts, res.translations)?;
        info!(lang = target, texts = expected, "page translated");
        Ok(expected)
    }
}
