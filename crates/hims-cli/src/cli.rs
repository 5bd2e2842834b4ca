use clap::{Parser, Subcommand, ValueEnum};
use hims_core::{AdmissionType, BedStatus};
use uuid::Uuid;

#[derive(Parser)]
#[command(name = "hims")]
#[command(about = "HIMS CLI: manage admissions and beds on a HIMS server")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Server base URL (overrides config and HIMS_URL env var)
    #[arg(short, long, global = true, env = "HIMS_URL")]
    pub server: Option<String>,

    /// Config profile name
    #[arg(short, long, global = true, env = "HIMS_PROFILE", default_value = "default")]
    pub profile: String,

    /// Output format
    #[arg(short, long, global = true)]
    pub format: Option<OutputFormat>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum, Default)]
pub enum OutputFormat {
    #[default]
    Table,
    Json,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Log in and store an access token
    Login(LoginArgs),
    /// Logout (remove stored credentials)
    Logout,
    /// Show the logged in staff member
    Whoami,
    /// Check server health and readiness
    Status,
    /// List beds
    Beds(BedsArgs),
    /// List ongoing admissions, or all admissions of a patient
    Admissions(AdmissionsArgs),
    /// Admit a patient
    Admit(AdmitArgs),
    /// Move an ongoing admission to another bed
    AssignBed(AssignBedArgs),
    /// Close an admission and release its bed
    Discharge(DischargeArgs),
    /// Manage CLI configuration
    Config(ConfigArgs),
}

#[derive(clap::Args)]
pub struct LoginArgs {
    /// Username
    #[arg(short, long)]
    pub username: String,
    /// Password
    #[arg(long, env = "HIMS_PASSWORD")]
    pub password: String,
}

#[derive(clap::Args)]
pub struct BedsArgs {
    /// Only beds of this service
    #[arg(long)]
    pub service: Option<String>,
    /// Only beds in this status (available, occupied, maintenance, reserved)
    #[arg(long, value_parser = parse_bed_status)]
    pub status: Option<BedStatus>,
    /// Only active beds that can take a patient now
    #[arg(long)]
    pub available: bool,
}

#[derive(clap::Args)]
pub struct AdmissionsArgs {
    /// Patient id; lists that patient's history instead of ongoing admissions
    #[arg(long)]
    pub patient: Option<Uuid>,
}

#[derive(clap::Args)]
pub struct AdmitArgs {
    /// Patient id
    #[arg(long)]
    pub patient: Uuid,
    /// Attending physician id
    #[arg(long)]
    pub physician: Uuid,
    /// emergency, scheduled or transfer
    #[arg(long = "type", value_parser = parse_admission_type)]
    pub admission_type: AdmissionType,
    #[arg(long)]
    pub reason: String,
    /// Entry diagnosis
    #[arg(long)]
    pub diagnosis: String,
    /// Bed id to claim
    #[arg(long)]
    pub bed: Option<Uuid>,
    /// Expected discharge date (YYYY-MM-DD)
    #[arg(long)]
    pub expected_discharge: Option<String>,
    #[arg(long)]
    pub remarks: Option<String>,
}

#[derive(clap::Args)]
pub struct AssignBedArgs {
    /// Admission id
    pub admission: Uuid,
    /// Bed id
    pub bed: Uuid,
}

#[derive(clap::Args)]
pub struct DischargeArgs {
    /// Admission id
    pub admission: Uuid,
}

#[derive(clap::Args)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub command: ConfigCommands,
}

#[derive(Subcommand)]
pub enum ConfigCommands {
    /// Show current config
    Show,
    /// Set config value
    Set(ConfigSetArgs),
}

#[derive(clap::Args)]
pub struct ConfigSetArgs {
    /// Key to set (server, format)
    pub key: String,
    /// Value
    pub value: String,
}

fn parse_bed_status(s: &str) -> Result<BedStatus, String> {
    s.parse().map_err(|e: hims_core::CoreError| e.to_string())
}

fn parse_admission_type(s: &str) -> Result<AdmissionType, String> {
    s.parse().map_err(|e: hims_core::CoreError| e.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_admit() {
        let patient = Uuid::new_v4();
        let physician = Uuid::new_v4();
        let cli = Cli::try_parse_from([
            "hims",
            "admit",
            "--patient",
            &patient.to_string(),
            "--physician",
            &physician.to_string(),
            "--type",
            "emergency",
            "--reason",
            "fall",
            "--diagnosis",
            "hip fracture",
        ])
        .unwrap();
        let Commands::Admit(args) = cli.command else {
            panic!("expected admit");
        };
        assert_eq!(args.patient, patient);
        assert_eq!(args.admission_type, AdmissionType::Emergency);
        assert!(args.bed.is_none());
        assert_eq!(cli.profile, "default");
    }

    #[test]
    fn test_rejects_unknown_bed_status() {
        assert!(Cli::try_parse_from(["hims", "beds", "--status", "broken"]).is_err());
        let cli = Cli::try_parse_from(["hims", "beds", "--status", "maintenance", "-f", "json"])
            .unwrap();
        assert_eq!(cli.format, Some(OutputFormat::Json));
    }
}
