pub mod audit_runner;
pub mod http;
pub mod kpi;
pub mod rules;
pub mod scoring;
pub mod site_signals;
pub mod text_analyzer;

pub use audit_runner::{AuditInput, AuditOutcome, AuditRunner};
pub use kpi::{build_kpi_report, AuditRecord};
pub use rules::{Evaluation, RulesEngine};
pub use site_signals::{SiteSignalCollector, SiteSignalSource};
