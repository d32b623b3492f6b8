use crate::{
    foundation::error::{LuminaError, LuminaResult},
    intent::model::{
        AmbiguityFlag, AmbiguityType, ClarificationValue, ConstraintKind, DesignIntent, DesignLayer,
    },
};

pub const OPEN_MANUAL_LABEL: &str = "Open manual controls";

#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
/// A question handed to the presentation layer.
pub struct ClarificationQuestion {
    /// Same as the originating ambiguity id; answers refer to it.
    pub id: String,
    pub kind: AmbiguityType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub layer_id: Option<String>,
    pub prompt: String,
    /// Best choice first; the last choice always opens manual controls.
    pub choices: Vec<Choice>,
}

#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Choice {
    pub label: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub description: String,
    /// Opaque to the presentation layer; echoed back in a [`ClarificationAnswer`].
    pub value: ClarificationValue,
}

#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
/// The user's pick for one question.
pub struct ClarificationAnswer {
    pub question_id: String,
    pub value: ClarificationValue,
}

#[derive(Clone, Debug, PartialEq)]
/// Result of folding answers into an intent.
pub enum Applied {
    /// Answers were applied; the intent must be validated again.
    Refined(DesignIntent),
    /// An answer asked to leave automatic composition.
    ManualRequested {
        /// Question that carried the request.
        question_id: String,
    },
}

/// Questions for every open ambiguity, most fundamental first.
///
/// Ordering is by ambiguity rank (zone, spacing, priority, then upstream categories) and then by
/// flag order, so the same intent always produces the same question list.
pub fn questions_for(intent: &DesignIntent) -> Vec<ClarificationQuestion> {
    let mut flags: Vec<&AmbiguityFlag> = intent.ambiguities.iter().collect();
    flags.sort_by_key(|f| f.kind.rank());
    flags.into_iter().map(question).collect()
}

fn question(flag: &AmbiguityFlag) -> ClarificationQuestion {
    let mut options = flag.options.clone();
    options.sort_by_key(|o| o.rank);

    let mut choices: Vec<Choice> = options
        .into_iter()
        .filter(|o| o.value != ClarificationValue::OpenManual)
        .map(|o| Choice {
            label: o.label,
            description: o.description,
            value: o.value,
        })
        .collect();
    if choices.is_empty() {
        choices.push(Choice {
            label: "Keep as is".to_string(),
            description: String::new(),
            value: ClarificationValue::KeepAsIs,
        });
    }
    choices.push(Choice {
        label: OPEN_MANUAL_LABEL.to_string(),
        description: "set the lights by hand instead".to_string(),
        value: ClarificationValue::OpenManual,
    });

    ClarificationQuestion {
        id: flag.id.clone(),
        kind: flag.kind,
        layer_id: flag.layer_id.clone(),
        prompt: flag.message.clone(),
        choices,
    }
}

/// Fold `answers` into a copy of `intent`, in order.
///
/// Each answer closes its question. An answer to a question that is not open (unknown, or
/// answered earlier in the same batch) or naming a missing layer is an error, and nothing is
/// applied. An `openManual` answer anywhere in the batch wins over the others.
pub fn apply_clarifications(
    intent: &DesignIntent,
    answers: &[ClarificationAnswer],
) -> LuminaResult<Applied> {
    let mut out = intent.clone();
    for answer in answers {
        let Some(pos) = out.ambiguities.iter().position(|a| a.id == answer.question_id) else {
            return Err(LuminaError::clarification(format!(
                "no open question '{}'",
                answer.question_id
            )));
        };
        out.ambiguities.remove(pos);
        apply_value(&mut out, &answer.question_id, &answer.value)?;
    }

    if let Some(manual) = answers
        .iter()
        .find(|a| a.value == ClarificationValue::OpenManual)
    {
        return Ok(Applied::ManualRequested {
            question_id: manual.question_id.clone(),
        });
    }

    for c in &mut out.constraints {
        if c.kind == ConstraintKind::Upstream && answers.iter().any(|a| a.question_id == c.id) {
            c.satisfied = true;
        }
    }
    Ok(Applied::Refined(out))
}

fn apply_value(
    intent: &mut DesignIntent,
    question_id: &str,
    value: &ClarificationValue,
) -> LuminaResult<()> {
    match value {
        ClarificationValue::SetZone { layer_id, zone } => {
            layer_mut(intent, layer_id)?.zone = zone.clone();
        }
        ClarificationValue::SetSpacing { layer_id, spacing } => {
            layer_mut(intent, layer_id)?.colors.spacing = spacing.clone();
        }
        ClarificationValue::SetPriority { layer_id, priority } => {
            layer_mut(intent, layer_id)?.priority = *priority;
        }
        ClarificationValue::SetPrimaryColor { layer_id, color } => {
            layer_mut(intent, layer_id)?.colors.primary = *color;
        }
        ClarificationValue::SetPattern { layer_id, pattern } => {
            layer_mut(intent, layer_id)?.pattern = pattern.clone();
        }
        ClarificationValue::DisableLayer { layer_id } => {
            layer_mut(intent, layer_id)?.enabled = false;
        }
        ClarificationValue::KeepAsIs => {
            if !intent.acknowledged.iter().any(|id| id == question_id) {
                intent.acknowledged.push(question_id.to_string());
            }
        }
        ClarificationValue::OpenManual => {}
    }
    Ok(())
}

fn layer_mut<'a>(
    intent: &'a mut DesignIntent,
    id: &str,
) -> LuminaResult<&'a mut DesignLayer> {
    intent
        .layer_mut(id)
        .ok_or_else(|| LuminaError::clarification(format!("answer names unknown layer '{id}'")))
}

#[cfg(test)]
#[path = "../../tests/unit/clarify/manager.rs"]
mod tests;
