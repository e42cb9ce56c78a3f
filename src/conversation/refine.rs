//! Refinement options and the prompt fragments they produce.

use serde::{Deserialize, Serialize};
use strum::{AsRefStr, EnumIter, IntoEnumIterator, IntoStaticStr};

use super::message::MessageId;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, EnumIter, AsRefStr, IntoStaticStr)]
pub enum Length {
    #[strum(serialize = "shorter")]
    Shorter,
    #[strum(serialize = "longer")]
    Longer,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, EnumIter, AsRefStr, IntoStaticStr)]
pub enum Clarity {
    #[strum(serialize = "more concise")]
    MoreConcise,
    #[strum(serialize = "more detailed")]
    MoreDetailed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, EnumIter, AsRefStr, IntoStaticStr)]
pub enum Tone {
    #[strum(serialize = "more casual")]
    MoreCasual,
    #[strum(serialize = "more professional")]
    MoreProfessional,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, EnumIter, AsRefStr, IntoStaticStr)]
pub enum Style {
    #[strum(serialize = "realistic")]
    Realistic,
    #[strum(serialize = "drawn cartoon")]
    DrawnCartoon,
    #[strum(serialize = "3d cartoon")]
    ThreeDCartoon,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, EnumIter, AsRefStr, IntoStaticStr)]
pub enum Blur {
    #[strum(serialize = "blurry background")]
    Background,
    #[strum(serialize = "blurry foreground")]
    Foreground,
}

/// Which option set the menu offers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RefineKind {
    Text,
    Image,
}

/// Current picks in the refine menu; each category holds at most one value
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RefineSelections {
    pub length: Option<Length>,
    pub clarity: Option<Clarity>,
    pub tone: Option<Tone>,
    pub style: Option<Style>,
    pub blur: Option<Blur>,
}

impl RefineSelections {
    pub fn reset_text(&mut self) {
        self.length = None;
        self.clarity = None;
        self.tone = None;
    }

    pub fn reset_image(&mut self) {
        self.style = None;
        self.blur = None;
    }

    pub fn has_image_choice(&self) -> bool {
        self.style.is_some() || self.blur.is_some()
    }

    /// Rewrite instruction for text targets, in length, clarity, tone order.
    /// Returns `None` when nothing is selected.
    pub fn text_instruction(&self) -> Option<String> {
        let mut instruction = String::new();
        if let Some(length) = self.length {
            instruction.push_str(&format!("make it {}. ", length.as_ref()));
        }
        if let Some(clarity) = self.clarity {
            instruction.push_str(&format!("make it {}. ", clarity.as_ref()));
        }
        if let Some(tone) = self.tone {
            instruction.push_str(&format!("make the tone {}. ", tone.as_ref()));
        }

        let trimmed = instruction.trim();
        if trimmed.is_empty() {
            None
        } else {
            Some(trimmed.to_string())
        }
    }

    /// Suffix appended to an image prompt, e.g. `, in a realistic style, with a blurry background`
    pub fn image_suffix(&self) -> String {
        let mut suffix = String::new();
        if let Some(style) = self.style {
            suffix.push_str(&format!(", in a {} style", style.as_ref()));
        }
        if let Some(blur) = self.blur {
            suffix.push_str(&format!(", with a {}", blur.as_ref()));
        }
        suffix
    }

    /// Caption for a refined image, e.g. `Generated image for: "cat" (Style: realistic)`
    pub fn image_caption(&self, prompt: &str) -> String {
        let mut caption = generated_image_caption(prompt);
        if let Some(style) = self.style {
            caption.push_str(&format!(" (Style: {})", style.as_ref()));
        }
        if let Some(blur) = self.blur {
            caption.push_str(&format!(" (Blur: {})", blur.as_ref()));
        }
        caption
    }
}

pub fn generated_image_caption(prompt: &str) -> String {
    format!("Generated image for: \"{prompt}\"")
}

/// Prompt asking the model to rewrite `text` under `instruction`
pub fn text_refinement_prompt(instruction: &str, text: &str) -> String {
    format!("Refine the following text by \"{instruction}\":\n\n\"{text}\"")
}

/// The refine menu while it is open: one target and the current selections
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RefineMenu {
    pub target: MessageId,
    pub kind: RefineKind,
    pub selections: RefineSelections,
}

/// One numbered line of the refine menu
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RefineOption {
    Length(Length),
    Clarity(Clarity),
    Tone(Tone),
    Style(Style),
    Blur(Blur),
}

impl RefineOption {
    /// Menu entries offered for `kind`, in display order
    pub fn entries(kind: RefineKind) -> Vec<RefineOption> {
        match kind {
            RefineKind::Text => Length::iter()
                .map(RefineOption::Length)
                .chain(Clarity::iter().map(RefineOption::Clarity))
                .chain(Tone::iter().map(RefineOption::Tone))
                .collect(),
            RefineKind::Image => Style::iter()
                .map(RefineOption::Style)
                .chain(Blur::iter().map(RefineOption::Blur))
                .collect(),
        }
    }

    pub fn category(&self) -> &'static str {
        match self {
            RefineOption::Length(_) => "Length",
            RefineOption::Clarity(_) => "Clarity",
            RefineOption::Tone(_) => "Tone",
            RefineOption::Style(_) => "Style",
            RefineOption::Blur(_) => "Blur",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            RefineOption::Length(value) => value.into(),
            RefineOption::Clarity(value) => value.into(),
            RefineOption::Tone(value) => value.into(),
            RefineOption::Style(value) => value.into(),
            RefineOption::Blur(value) => value.into(),
        }
    }

    pub fn is_selected(&self, selections: &RefineSelections) -> bool {
        match *self {
            RefineOption::Length(value) => selections.length == Some(value),
            RefineOption::Clarity(value) => selections.clarity == Some(value),
            RefineOption::Tone(value) => selections.tone == Some(value),
            RefineOption::Style(value) => selections.style == Some(value),
            RefineOption::Blur(value) => selections.blur == Some(value),
        }
    }

    /// Select this option, or clear its category when it is already selected
    pub fn toggle(&self, selections: &mut RefineSelections) {
        let selected = self.is_selected(selections);
        match *self {
            RefineOption::Length(value) => selections.length = (!selected).then_some(value),
            RefineOption::Clarity(value) => selections.clarity = (!selected).then_some(value),
            RefineOption::Tone(value) => selections.tone = (!selected).then_some(value),
            RefineOption::Style(value) => selections.style = (!selected).then_some(value),
            RefineOption::Blur(value) => selections.blur = (!selected).then_some(value),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn text_instruction_follows_fixed_order() {
        let selections = RefineSelections {
            tone: Some(Tone::MoreProfessional),
            length: Some(Length::Shorter),
            clarity: Some(Clarity::MoreDetailed),
            ..Default::default()
        };
        assert_eq!(
            selections.text_instruction().as_deref(),
            Some("make it shorter. make it more detailed. make the tone more professional.")
        );
    }

    #[test]
    fn empty_selection_has_no_instruction() {
        assert_eq!(RefineSelections::default().text_instruction(), None);
        assert_eq!(RefineSelections::default().image_suffix(), "");
    }

    #[test]
    fn image_suffix_combines_style_and_blur() {
        let selections = RefineSelections {
            style: Some(Style::ThreeDCartoon),
            blur: Some(Blur::Foreground),
            ..Default::default()
        };
        assert_eq!(
            selections.image_suffix(),
            ", in a 3d cartoon style, with a blurry foreground"
        );
        assert_eq!(
            selections.image_caption("a cat"),
            "Generated image for: \"a cat\" (Style: 3d cartoon) (Blur: blurry foreground)"
        );
    }

    #[test]
    fn toggle_selects_then_clears() {
        let mut selections = RefineSelections::default();
        let option = RefineOption::Style(Style::Realistic);
        option.toggle(&mut selections);
        assert_eq!(selections.style, Some(Style::Realistic));
        RefineOption::Style(Style::DrawnCartoon).toggle(&mut selections);
        assert_eq!(selections.style, Some(Style::DrawnCartoon));
        RefineOption::Style(Style::DrawnCartoon).toggle(&mut selections);
        assert_eq!(selections.style, None);
    }

    #[test]
    fn menus_offer_the_right_entries() {
        assert_eq!(RefineOption::entries(RefineKind::Text).len(), 6);
        assert_eq!(RefineOption::entries(RefineKind::Image).len(), 5);
    }
}
