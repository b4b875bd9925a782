mod decision;
mod decision_table;
mod document;
mod rule;

pub use decision::ProjectDecision;
pub use decision_table::{DecisionTable, ProjectFilter};
pub use document::{Document, DocumentBuilder, TestListBuilder};
pub use rule::{BuildDepRule, BuildRule, IncludeRule, Rule, TestMapRule};
