/// Rule book adapters for evaluating IAM bindings
mod pattern;
mod rule_book;
mod yaml_rules_engine;

pub use rule_book::{RuleBook, RuleMode};
pub use yaml_rules_engine::YamlRulesEngine;
