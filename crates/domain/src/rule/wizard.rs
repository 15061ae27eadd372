//! Rule wizard: a step machine over a [`RuleDraft`].
//!
//! ```text
//! Basics → Conditions → Action → Review → Submitted
//! ```
//!
//! `next` only advances when the current step's check passes. `back` never
//! checks anything. `Submitted` is terminal.

use crate::error::ValidationError;

use super::{DraftError, DraftUpdate, Rule, RuleDraft};

/// A wizard step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WizardStep {
    Basics,
    Conditions,
    Action,
    Review,
    Submitted,
}

impl WizardStep {
    /// 1-based position, as shown in step indicators.
    #[must_use]
    pub fn number(self) -> u8 {
        match self {
            Self::Basics => 1,
            Self::Conditions => 2,
            Self::Action => 3,
            Self::Review => 4,
            Self::Submitted => 5,
        }
    }

    fn next(self) -> Self {
        match self {
            Self::Basics => Self::Conditions,
            Self::Conditions => Self::Action,
            Self::Action | Self::Review => Self::Review,
            Self::Submitted => Self::Submitted,
        }
    }

    fn previous(self) -> Self {
        match self {
            Self::Basics | Self::Conditions => Self::Basics,
            Self::Action => Self::Conditions,
            Self::Review => Self::Action,
            Self::Submitted => Self::Submitted,
        }
    }

    /// Check the part of `draft` this step is responsible for.
    fn check(self, draft: &RuleDraft) -> Result<(), ValidationError> {
        match self {
            Self::Basics => {
                if draft.name.trim().is_empty() {
                    return Err(ValidationError::EmptyName);
                }
                Ok(())
            }
            Self::Conditions => {
                if draft.initiators.is_empty() {
                    return Err(ValidationError::NoInitiators);
                }
                draft.initiators.iter().try_for_each(|i| i.validate())
            }
            Self::Action => {
                let action = draft
                    .action
                    .as_ref()
                    .ok_or(ValidationError::MissingField("action"))?;
                action.check_params(&serde_json::Value::Object(draft.action_params.clone()))
            }
            Self::Review | Self::Submitted => Ok(()),
        }
    }
}

/// Why a wizard transition was refused.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum WizardError {
    /// The current step's check failed.
    #[error("step {step:?} is incomplete")]
    Incomplete {
        step: WizardStep,
        #[source]
        reason: ValidationError,
    },
    /// The draft update itself was refused.
    #[error(transparent)]
    Draft(#[from] DraftError),
    /// Submission is only possible from the review step.
    #[error("the wizard is at step {0:?}, not at review")]
    NotAtReview(WizardStep),
    /// The wizard already produced its rule.
    #[error("the wizard has already been submitted")]
    AlreadySubmitted,
}

/// Drives a [`RuleDraft`] through the wizard steps.
#[derive(Debug, Clone)]
pub struct RuleWizard {
    step: WizardStep,
    draft: RuleDraft,
}

impl Default for RuleWizard {
    fn default() -> Self {
        Self::new(RuleDraft::default())
    }
}

impl RuleWizard {
    /// Start at step one with `draft`.
    #[must_use]
    pub fn new(draft: RuleDraft) -> Self {
        Self {
            step: WizardStep::Basics,
            draft,
        }
    }

    /// Start editing an existing rule.
    #[must_use]
    pub fn edit(rule: &Rule) -> Self {
        Self::new(RuleDraft::from_rule(rule))
    }

    #[must_use]
    pub fn step(&self) -> WizardStep {
        self.step
    }

    #[must_use]
    pub fn draft(&self) -> &RuleDraft {
        &self.draft
    }

    /// Apply an edit to the draft.
    ///
    /// # Errors
    ///
    /// Returns [`WizardError::AlreadySubmitted`] once submitted, or the
    /// draft's own refusal.
    pub fn update(&mut self, update: DraftUpdate) -> Result<(), WizardError> {
        if self.step == WizardStep::Submitted {
            return Err(WizardError::AlreadySubmitted);
        }
        self.draft.apply(update)?;
        Ok(())
    }

    /// Advance when the current step is complete.
    ///
    /// # Errors
    ///
    /// Returns [`WizardError::Incomplete`] naming what blocks the step.
    pub fn next(&mut self) -> Result<WizardStep, WizardError> {
        if self.step == WizardStep::Submitted {
            return Err(WizardError::AlreadySubmitted);
        }
        self.step
            .check(&self.draft)
            .map_err(|reason| WizardError::Incomplete {
                step: self.step,
                reason,
            })?;
        self.step = self.step.next();
        Ok(self.step)
    }

    /// Go back one step without checking anything.
    pub fn back(&mut self) -> WizardStep {
        self.step = self.step.previous();
        self.step
    }

    /// Finalize the draft from the review step.
    ///
    /// # Errors
    ///
    /// Returns [`WizardError::NotAtReview`] before the review step,
    /// [`WizardError::AlreadySubmitted`] afterwards, or
    /// [`WizardError::Incomplete`] if the draft no longer validates.
    pub fn submit(&mut self) -> Result<Rule, WizardError> {
        match self.step {
            WizardStep::Review => {}
            WizardStep::Submitted => return Err(WizardError::AlreadySubmitted),
            step => return Err(WizardError::NotAtReview(step)),
        }
        let rule = self
            .draft
            .to_rule()
            .map_err(|reason| WizardError::Incomplete {
                step: WizardStep::Review,
                reason,
            })?;
        self.step = WizardStep::Submitted;
        Ok(rule)
    }
}
