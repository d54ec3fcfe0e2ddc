//! Ordered classification rules for step-type codes and cycle names.
//!
//! Each table is evaluated top to bottom and the first matching rule wins.
//! Order is the tie-break between overlapping keywords and is part of the
//! contract: `POST_IUI` contains both `POST` and `IUI` and must land on the
//! post-insemination step, `EMBRYO_TRANSFER` contains `EMBRYO` and must land on
//! transfer rather than culture, `STIM_MONITORING` must land on monitoring.
//! Reordering a table changes classification results.

use crate::domain::catalog::StepKind;
use crate::domain::foundation::Protocol;

/// A single textual predicate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Pattern {
    /// Substring anywhere in the normalized input.
    Contains(&'static str),
    /// Whole token, where tokens are split on non-alphanumeric characters.
    /// Used for short codes like `ET` that occur inside unrelated words.
    Token(&'static str),
}

impl Pattern {
    fn matches(&self, input: &NormalizedInput<'_>) -> bool {
        match self {
            Pattern::Contains(needle) => input.text.contains(needle),
            Pattern::Token(token) => input.tokens.iter().any(|t| t == token),
        }
    }
}

/// A rule fires when every `all` pattern matches and, if `any` is non-empty,
/// at least one `any` pattern matches.
#[derive(Debug, Clone, Copy)]
pub struct Rule {
    pub all: &'static [Pattern],
    pub any: &'static [Pattern],
    pub kind: StepKind,
}

impl Rule {
    fn matches(&self, input: &NormalizedInput<'_>) -> bool {
        self.all.iter().all(|p| p.matches(input))
            && (self.any.is_empty() || self.any.iter().any(|p| p.matches(input)))
    }
}

/// Input text after case folding, with its token split.
pub struct NormalizedInput<'a> {
    text: &'a str,
    tokens: Vec<&'a str>,
}

impl<'a> NormalizedInput<'a> {
    pub fn new(text: &'a str) -> Self {
        let tokens = text
            .split(|c: char| !c.is_ascii_alphanumeric())
            .filter(|t| !t.is_empty())
            .collect();
        Self { text, tokens }
    }
}

/// Returns the kind named by the first matching rule.
pub fn first_match(rules: &[Rule], input: &NormalizedInput<'_>) -> Option<StepKind> {
    rules.iter().find(|rule| rule.matches(input)).map(|rule| rule.kind)
}

use Pattern::{Contains, Token};

// ─────────────────────────────────────────────────────────────────────
// Step-type codes (matched uppercased)
// ─────────────────────────────────────────────────────────────────────

const IVF_STEP_TYPE_RULES: &[Rule] = &[
    Rule {
        all: &[Contains("POST")],
        any: &[Contains("TRANSFER"), Token("ET"), Token("FET")],
        kind: StepKind::PregnancyTest,
    },
    Rule {
        all: &[],
        any: &[Contains("PREG"), Contains("BETA"), Contains("BHCG")],
        kind: StepKind::PregnancyTest,
    },
    Rule {
        all: &[],
        any: &[Contains("TRIGGER")],
        kind: StepKind::Trigger,
    },
    Rule {
        all: &[],
        any: &[Contains("MONITOR"), Contains("ULTRASOUND"), Contains("FOLLIC")],
        kind: StepKind::Monitoring,
    },
    Rule {
        all: &[],
        any: &[Contains("STIM"), Token("COS")],
        kind: StepKind::Stimulation,
    },
    Rule {
        all: &[],
        any: &[
            Token("OPU"),
            Contains("RETRIEVAL"),
            Contains("PICKUP"),
            Contains("EGG_COLLECTION"),
        ],
        kind: StepKind::OocyteRetrieval,
    },
    Rule {
        all: &[],
        any: &[Contains("FERTILI"), Token("ICSI"), Contains("INSEMIN")],
        kind: StepKind::Fertilization,
    },
    Rule {
        all: &[],
        any: &[Contains("TRANSFER"), Token("ET"), Token("FET")],
        kind: StepKind::EmbryoTransfer,
    },
    Rule {
        all: &[],
        any: &[Contains("CULTURE"), Contains("BLAST"), Contains("EMBRYO")],
        kind: StepKind::EmbryoCulture,
    },
];

const IUI_STEP_TYPE_RULES: &[Rule] = &[
    Rule {
        all: &[Contains("POST")],
        any: &[Contains("IUI"), Contains("INSEMIN")],
        kind: StepKind::PostInsemination,
    },
    Rule {
        all: &[],
        any: &[Contains("LUTEAL")],
        kind: StepKind::PostInsemination,
    },
    Rule {
        all: &[],
        any: &[Contains("PREG"), Contains("BETA"), Contains("BHCG")],
        kind: StepKind::PregnancyTest,
    },
    Rule {
        all: &[],
        any: &[Contains("TRIGGER")],
        kind: StepKind::Trigger,
    },
    Rule {
        all: &[],
        any: &[Contains("MONITOR"), Contains("ULTRASOUND"), Contains("FOLLIC")],
        kind: StepKind::Monitoring,
    },
    Rule {
        all: &[],
        any: &[Contains("STIM")],
        kind: StepKind::Stimulation,
    },
    Rule {
        all: &[],
        any: &[
            Contains("CONSULT"),
            Contains("INITIAL"),
            Contains("BASELINE"),
            Contains("EVALUATION"),
        ],
        kind: StepKind::Consultation,
    },
    Rule {
        all: &[],
        any: &[Contains("INSEMIN"), Token("IUI")],
        kind: StepKind::Insemination,
    },
];

// ─────────────────────────────────────────────────────────────────────
// Cycle names (matched lowercased)
// ─────────────────────────────────────────────────────────────────────

const IVF_CYCLE_NAME_RULES: &[Rule] = &[
    Rule {
        all: &[Contains("post")],
        any: &[Contains("transfer"), Token("et"), Token("fet")],
        kind: StepKind::PregnancyTest,
    },
    Rule {
        all: &[],
        any: &[
            Contains("pregnan"),
            Contains("beta"),
            Contains("bhcg"),
            Contains("hcg test"),
        ],
        kind: StepKind::PregnancyTest,
    },
    Rule {
        all: &[],
        any: &[Contains("trigger")],
        kind: StepKind::Trigger,
    },
    Rule {
        all: &[],
        any: &[
            Contains("monitor"),
            Contains("ultrasound"),
            Contains("scan"),
            Contains("follic"),
        ],
        kind: StepKind::Monitoring,
    },
    Rule {
        all: &[],
        any: &[Contains("stim")],
        kind: StepKind::Stimulation,
    },
    Rule {
        all: &[],
        any: &[
            Token("opu"),
            Contains("retriev"),
            Contains("egg collection"),
            Contains("pick up"),
            Contains("pickup"),
        ],
        kind: StepKind::OocyteRetrieval,
    },
    Rule {
        all: &[],
        any: &[Contains("fertili"), Token("icsi"), Contains("insemin")],
        kind: StepKind::Fertilization,
    },
    Rule {
        all: &[],
        any: &[Contains("transfer"), Token("et"), Token("fet")],
        kind: StepKind::EmbryoTransfer,
    },
    Rule {
        all: &[],
        any: &[Contains("culture"), Contains("blast"), Contains("embryo")],
        kind: StepKind::EmbryoCulture,
    },
];

const IUI_CYCLE_NAME_RULES: &[Rule] = &[
    Rule {
        all: &[Contains("post")],
        any: &[Contains("iui"), Contains("insemin")],
        kind: StepKind::PostInsemination,
    },
    Rule {
        all: &[],
        any: &[Contains("luteal")],
        kind: StepKind::PostInsemination,
    },
    Rule {
        all: &[],
        any: &[
            Contains("pregnan"),
            Contains("beta"),
            Contains("bhcg"),
            Contains("hcg test"),
        ],
        kind: StepKind::PregnancyTest,
    },
    Rule {
        all: &[],
        any: &[Contains("trigger")],
        kind: StepKind::Trigger,
    },
    Rule {
        all: &[],
        any: &[
            Contains("monitor"),
            Contains("ultrasound"),
            Contains("scan"),
            Contains("follic"),
        ],
        kind: StepKind::Monitoring,
    },
    Rule {
        all: &[],
        any: &[Contains("stim")],
        kind: StepKind::Stimulation,
    },
    Rule {
        all: &[],
        any: &[
            Contains("consult"),
            Contains("initial"),
            Contains("baseline"),
            Contains("evaluation"),
            Contains("first visit"),
        ],
        kind: StepKind::Consultation,
    },
    Rule {
        all: &[],
        any: &[Contains("insemin"), Token("iui")],
        kind: StepKind::Insemination,
    },
];

/// Rules for categorical step-type codes.
pub fn step_type_rules(protocol: Protocol) -> &'static [Rule] {
    match protocol {
        Protocol::Ivf => IVF_STEP_TYPE_RULES,
        Protocol::Iui => IUI_STEP_TYPE_RULES,
    }
}

/// Rules for free-text cycle names.
pub fn cycle_name_rules(protocol: Protocol) -> &'static [Rule] {
    match protocol {
        Protocol::Ivf => IVF_CYCLE_NAME_RULES,
        Protocol::Iui => IUI_CYCLE_NAME_RULES,
    }
}
