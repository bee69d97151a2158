//! Server configuration from command-line flags and environment.

use clap::Parser;
use patient_records_core::{PatientStore, ValidationRules};
use std::net::SocketAddr;
use std::path::PathBuf;

/// Main configuration.
#[derive(Debug, Clone, Parser)]
#[command(
    name = "patient-records",
    version,
    about = "HTTP API for managing patient records in a JSON file",
    long_about = "Serves the patient record store over HTTP.\n\n\
        Records live in a single JSON document that is re-read on every\n\
        request and rewritten on every change.\n\n\
        EXAMPLES:\n\
        \n  patient-records --data-file patients.json\n\
        \n  patient-records --bind 0.0.0.0:8080 --email-domain hdfc.com --email-domain icici.com"
)]
pub struct ServerConfig {
    /// Address to listen on
    #[arg(long, env = "PATIENTS_BIND", default_value = "127.0.0.1:8000")]
    pub bind: SocketAddr,

    /// JSON document holding the patient records
    #[arg(long, env = "PATIENTS_FILE", value_name = "FILE", default_value = "patients.json")]
    pub data_file: PathBuf,

    /// Email domain accepted for the optional email field (repeatable;
    /// any domain is accepted when none is given)
    #[arg(
        long = "email-domain",
        env = "PATIENTS_EMAIL_DOMAINS",
        value_name = "DOMAIN",
        value_delimiter = ','
    )]
    pub email_domains: Vec<String>,

    /// Log filter directive, overridden by RUST_LOG when set
    #[arg(long, env = "PATIENTS_LOG", default_value = "info")]
    pub log_level: String,
}

impl ServerConfig {
    pub fn validation_rules(&self) -> ValidationRules {
        ValidationRules::with_email_domains(self.email_domains.iter().cloned())
    }

    /// Build the store handle shared by every request.
    pub fn open_store(&self) -> PatientStore {
        PatientStore::new(&self.data_file).with_rules(self.validation_rules())
    }
}
