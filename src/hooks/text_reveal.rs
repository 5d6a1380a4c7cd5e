//! Text that reveals one grapheme, word or line at a time.
//!
//! Segments are rendered hidden from assistive technology; the whole text
//! is exposed once through [`TextReveal::accessible_label`] so screen
//! readers never hear it piecemeal.

use unicode_segmentation::UnicodeSegmentation;

use super::props::AnimationProps;
use super::stagger::{Stagger, StaggerOptions, use_stagger_animation};
use crate::config::Trigger;
use crate::performance::Feature;
use crate::platform::ElementRef;
use crate::provider::use_motion_context;

pub const DEFAULT_TEXT_PRESET: &str = "textReveal";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SplitBy {
    /// User-perceived characters.
    #[default]
    Grapheme,
    Word,
    Line,
}

/// Cut `text` into reveal segments.
///
/// Grapheme and word segments concatenate back to `text`; whitespace rides
/// along with the word before it. Lines drop their terminators.
pub fn split_text(text: &str, by: SplitBy) -> Vec<String> {
    match by {
        SplitBy::Grapheme => text.graphemes(true).map(str::to_string).collect(),
        SplitBy::Word => {
            let mut segments: Vec<String> = Vec::new();
            for token in text.split_word_bounds() {
                let blank = token.chars().all(char::is_whitespace);
                match segments.last_mut() {
                    Some(last) if blank => last.push_str(token),
                    _ => segments.push(token.to_string()),
                }
            }
            segments
        }
        SplitBy::Line => text.lines().map(str::to_string).collect(),
    }
}

#[derive(Clone, Debug)]
pub struct TextRevealOptions {
    pub split: SplitBy,
    pub preset: String,
    /// Gap between segments; defaults to the preset's.
    pub stagger_ms: Option<f32>,
    pub trigger: Option<Trigger>,
}

impl TextRevealOptions {
    pub fn split(mut self, split: SplitBy) -> Self {
        self.split = split;
        self
    }

    pub fn preset(mut self, id: impl Into<String>) -> Self {
        self.preset = id.into();
        self
    }

    pub fn stagger_ms(mut self, ms: f32) -> Self {
        self.stagger_ms = Some(ms);
        self
    }

    pub fn trigger(mut self, trigger: Trigger) -> Self {
        self.trigger = Some(trigger);
        self
    }
}

impl Default for TextRevealOptions {
    fn default() -> Self {
        Self {
            split: SplitBy::default(),
            preset: DEFAULT_TEXT_PRESET.to_string(),
            stagger_ms: None,
            trigger: None,
        }
    }
}

#[derive(Clone)]
pub struct TextReveal {
    label: String,
    segments: Vec<String>,
    sequence: Stagger,
}

pub fn use_text_reveal(text: &str, options: TextRevealOptions) -> TextReveal {
    use_motion_context().record_feature(Feature::TextReveal);

    let segments = split_text(text, options.split);
    let mut stagger = StaggerOptions::new().preset(options.preset);
    if let Some(ms) = options.stagger_ms {
        stagger = stagger.stagger_ms(ms);
    }
    if let Some(trigger) = options.trigger {
        stagger = stagger.trigger(trigger);
    }
    let sequence = use_stagger_animation(segments.len(), stagger);

    TextReveal {
        label: text.to_string(),
        segments,
        sequence,
    }
}

impl TextReveal {
    /// The full text, for `aria-label`.
    pub fn accessible_label(&self) -> &str {
        &self.label
    }

    pub fn segments(&self) -> &[String] {
        &self.segments
    }

    pub fn segment_props(&self, index: usize) -> AnimationProps {
        self.sequence.get_item_props(index)
    }

    pub fn container_ref(&self) -> ElementRef {
        self.sequence.container_ref()
    }

    pub fn sequence(&self) -> &Stagger {
        &self.sequence
    }

    pub fn is_animating(&self) -> bool {
        self.sequence.is_animating()
    }

    pub fn is_complete(&self) -> bool {
        self.sequence.is_complete()
    }

    pub fn trigger_animation(&self) {
        self.sequence.trigger_animation();
    }

    pub fn reset_animation(&self) {
        self.sequence.reset_animation();
    }

    pub fn dispose(&self) {
        self.sequence.dispose();
    }
}
