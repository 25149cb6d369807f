use serde::{Deserialize, Serialize};

/// Named scoring scheme applied to a ticket.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TemplateKind {
    IncidentLogging,
    IncidentHandling,
    CustomerService,
}

impl TemplateKind {
    pub const fn all() -> [TemplateKind; 3] {
        [
            TemplateKind::IncidentLogging,
            TemplateKind::IncidentHandling,
            TemplateKind::CustomerService,
        ]
    }

    pub const fn label(self) -> &'static str {
        match self {
            TemplateKind::IncidentLogging => "Incident Logging",
            TemplateKind::IncidentHandling => "Incident Handling",
            TemplateKind::CustomerService => "Customer Service",
        }
    }

    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_lowercase().replace('_', "-").as_str() {
            "incident-logging" | "logging" => Some(Self::IncidentLogging),
            "incident-handling" | "handling" => Some(Self::IncidentHandling),
            "customer-service" | "service" => Some(Self::CustomerService),
            _ => None,
        }
    }
}

/// Which component produces the verdict for a criterion.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EvaluationSource {
    Rule,
    Narrative,
}

/// How the aggregator treats a criterion's verdict.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PolicyClass {
    /// Numeric points added toward the template maximum.
    Additive,
    /// Subtracts from the base score; a FAIL sentinel costs the fixed penalty,
    /// a custom magnitude costs exactly that magnitude.
    Deduction { penalty: u16 },
    /// A FAIL sentinel zeroes the whole ticket regardless of the base score.
    AutoFail,
}

/// Static definition of one scored aspect of ticket quality.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct CriterionDefinition {
    pub key: &'static str,
    pub name: &'static str,
    pub max_points: u16,
    pub source: EvaluationSource,
    pub policy: PolicyClass,
}

/// Ordered set of criteria defining one complete scoring scheme.
///
/// Constructed once per process through [`EvaluationTemplate::standard`] and
/// validated at load time; misconfigured templates never reach the
/// aggregator.
#[derive(Debug, Clone)]
pub struct EvaluationTemplate {
    kind: TemplateKind,
    max_score: u16,
    criteria: Vec<CriterionDefinition>,
}

impl EvaluationTemplate {
    pub fn standard(kind: TemplateKind) -> Result<Self, TemplateError> {
        let template = Self {
            kind,
            max_score: 70,
            criteria: standard_criteria(kind),
        };
        template.validate()?;
        Ok(template)
    }

    pub fn kind(&self) -> TemplateKind {
        self.kind
    }

    pub fn max_score(&self) -> u16 {
        self.max_score
    }

    pub fn criteria(&self) -> &[CriterionDefinition] {
        &self.criteria
    }

    pub fn criterion(&self, key: &str) -> Option<&CriterionDefinition> {
        self.criteria.iter().find(|definition| definition.key == key)
    }

    pub fn policy_for(&self, key: &str) -> Option<PolicyClass> {
        self.criterion(key).map(|definition| definition.policy)
    }

    /// Sum of the additive criterion maxima.
    pub fn additive_max(&self) -> u16 {
        self.criteria
            .iter()
            .filter(|definition| definition.policy == PolicyClass::Additive)
            .map(|definition| definition.max_points)
            .sum()
    }

    fn validate(&self) -> Result<(), TemplateError> {
        for (index, definition) in self.criteria.iter().enumerate() {
            if self.criteria[..index]
                .iter()
                .any(|earlier| earlier.key == definition.key)
            {
                return Err(TemplateError::DuplicateCriterion {
                    kind: self.kind,
                    key: definition.key,
                });
            }
        }

        let additive = self.additive_max();
        if additive == 0 {
            return Err(TemplateError::NoAdditivePoints { kind: self.kind });
        }
        if additive != self.max_score {
            return Err(TemplateError::MaxScoreMismatch {
                kind: self.kind,
                declared: self.max_score,
                additive,
            });
        }

        Ok(())
    }
}

/// Fatal configuration error raised while loading a template.
#[derive(Debug, thiserror::Error)]
pub enum TemplateError {
    #[error("template {kind:?} declares {declared} points but its additive criteria sum to {additive}")]
    MaxScoreMismatch {
        kind: TemplateKind,
        declared: u16,
        additive: u16,
    },
    #[error("template {kind:?} defines no additive points")]
    NoAdditivePoints { kind: TemplateKind },
    #[error("template {kind:?} defines criterion '{key}' more than once")]
    DuplicateCriterion { kind: TemplateKind, key: &'static str },
}

const VALIDATION_PENALTY: u16 = 15;

fn special_criteria() -> [CriterionDefinition; 2] {
    [
        CriterionDefinition {
            key: "critical_process",
            name: "Critical Process",
            max_points: 0,
            source: EvaluationSource::Rule,
            policy: PolicyClass::AutoFail,
        },
        CriterionDefinition {
            key: "validation_performed",
            name: "Validation",
            max_points: 0,
            source: EvaluationSource::Rule,
            policy: PolicyClass::Deduction {
                penalty: VALIDATION_PENALTY,
            },
        },
    ]
}

fn standard_criteria(kind: TemplateKind) -> Vec<CriterionDefinition> {
    let mut criteria: Vec<CriterionDefinition> = special_criteria().to_vec();

    match kind {
        TemplateKind::IncidentLogging => criteria.extend([
            CriterionDefinition {
                key: "correct_category",
                name: "Category",
                max_points: 10,
                source: EvaluationSource::Rule,
                policy: PolicyClass::Additive,
            },
            CriterionDefinition {
                key: "correct_subcategory",
                name: "Subcategory",
                max_points: 10,
                source: EvaluationSource::Rule,
                policy: PolicyClass::Additive,
            },
            CriterionDefinition {
                key: "correct_service",
                name: "Service",
                max_points: 10,
                source: EvaluationSource::Narrative,
                policy: PolicyClass::Additive,
            },
            CriterionDefinition {
                key: "correct_ci",
                name: "Configuration Item",
                max_points: 10,
                source: EvaluationSource::Narrative,
                policy: PolicyClass::Additive,
            },
            CriterionDefinition {
                key: "summary_format",
                name: "Short Description",
                max_points: 8,
                source: EvaluationSource::Rule,
                policy: PolicyClass::Additive,
            },
            CriterionDefinition {
                key: "accurate_description",
                name: "Description",
                max_points: 20,
                source: EvaluationSource::Narrative,
                policy: PolicyClass::Additive,
            },
            CriterionDefinition {
                key: "spelling_grammar",
                name: "Spelling/Grammar",
                max_points: 2,
                source: EvaluationSource::Narrative,
                policy: PolicyClass::Additive,
            },
        ]),
        TemplateKind::IncidentHandling => criteria.extend([
            CriterionDefinition {
                key: "correct_priority",
                name: "Priority",
                max_points: 5,
                source: EvaluationSource::Rule,
                policy: PolicyClass::Additive,
            },
            CriterionDefinition {
                key: "troubleshooting_quality",
                name: "Troubleshooting",
                max_points: 20,
                source: EvaluationSource::Narrative,
                policy: PolicyClass::Additive,
            },
            CriterionDefinition {
                key: "interaction_vs_incident",
                name: "Interaction vs Incident",
                max_points: 5,
                source: EvaluationSource::Rule,
                policy: PolicyClass::Additive,
            },
            CriterionDefinition {
                key: "routing_resolving",
                name: "Routing/Resolving",
                max_points: 20,
                source: EvaluationSource::Narrative,
                policy: PolicyClass::Additive,
            },
            CriterionDefinition {
                key: "resolution_code",
                name: "Resolution Code",
                max_points: 5,
                source: EvaluationSource::Rule,
                policy: PolicyClass::Additive,
            },
            CriterionDefinition {
                key: "resolution_notes",
                name: "Resolution Notes",
                max_points: 15,
                source: EvaluationSource::Narrative,
                policy: PolicyClass::Additive,
            },
        ]),
        TemplateKind::CustomerService => criteria.extend([
            CriterionDefinition {
                key: "greeting",
                name: "Greeting",
                max_points: 5,
                source: EvaluationSource::Narrative,
                policy: PolicyClass::Additive,
            },
            CriterionDefinition {
                key: "offer_workaround",
                name: "Offer Work Around",
                max_points: 10,
                source: EvaluationSource::Narrative,
                policy: PolicyClass::Additive,
            },
            CriterionDefinition {
                key: "necessary_troubleshooting",
                name: "Necessary Troubleshooting",
                max_points: 10,
                source: EvaluationSource::Narrative,
                policy: PolicyClass::Additive,
            },
            CriterionDefinition {
                key: "self_resolve_training",
                name: "Self-Resolve Training",
                max_points: 10,
                source: EvaluationSource::Narrative,
                policy: PolicyClass::Additive,
            },
            CriterionDefinition {
                key: "resolution_follow_through",
                name: "Resolution Follow-through",
                max_points: 10,
                source: EvaluationSource::Narrative,
                policy: PolicyClass::Additive,
            },
            CriterionDefinition {
                key: "closing_message",
                name: "Closing Message",
                max_points: 5,
                source: EvaluationSource::Narrative,
                policy: PolicyClass::Additive,
            },
            CriterionDefinition {
                key: "general_customer_service",
                name: "General Customer Service",
                max_points: 20,
                source: EvaluationSource::Narrative,
                policy: PolicyClass::Additive,
            },
        ]),
    }

    criteria
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn additive_maxima_sum_to_declared_maximum_for_all_templates() {
        for kind in TemplateKind::all() {
            let template = EvaluationTemplate::standard(kind).expect("standard template loads");
            assert_eq!(template.additive_max(), template.max_score(), "{kind:?}");
        }
    }

    #[test]
    fn every_criterion_has_one_source_and_one_policy() {
        for kind in TemplateKind::all() {
            let template = EvaluationTemplate::standard(kind).expect("template loads");
            for definition in template.criteria() {
                assert_eq!(
                    template.policy_for(definition.key),
                    Some(definition.policy)
                );
            }
        }
    }

    #[test]
    fn special_criteria_are_present_in_every_template() {
        for kind in TemplateKind::all() {
            let template = EvaluationTemplate::standard(kind).expect("template loads");
            assert_eq!(
                template.policy_for("validation_performed"),
                Some(PolicyClass::Deduction { penalty: 15 })
            );
            assert_eq!(template.policy_for("critical_process"), Some(PolicyClass::AutoFail));
        }
    }

    #[test]
    fn template_without_additive_points_is_rejected() {
        let template = EvaluationTemplate {
            kind: TemplateKind::IncidentLogging,
            max_score: 70,
            criteria: special_criteria().to_vec(),
        };
        let error = template.validate().expect_err("no additive points");
        assert!(matches!(error, TemplateError::NoAdditivePoints { .. }));
    }

    #[test]
    fn mismatched_declared_maximum_is_rejected() {
        let mut template =
            EvaluationTemplate::standard(TemplateKind::IncidentLogging).expect("template loads");
        template.max_score = 90;
        let error = template.validate().expect_err("sum mismatch");
        assert!(matches!(
            error,
            TemplateError::MaxScoreMismatch {
                declared: 90,
                additive: 70,
                ..
            }
        ));
    }

    #[test]
    fn template_kind_parses_cli_spellings() {
        assert_eq!(
            TemplateKind::parse("incident_logging"),
            Some(TemplateKind::IncidentLogging)
        );
        assert_eq!(
            TemplateKind::parse("Customer-Service"),
            Some(TemplateKind::CustomerService)
        );
        assert_eq!(TemplateKind::parse("unknown"), None);
    }
}
