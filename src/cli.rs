//! Command-line argument definitions.

use std::path::PathBuf;

use chrono::NaiveDate;
use clap::{Args, Parser, Subcommand};

use crate::config::{DATA_DIR_ENV, NOTIFY_CMD_ENV, TICK_INTERVAL};

#[derive(Debug, Parser)]
#[command(name = "pastillas", version, about = "Local medication organizer")]
pub struct Cli {
    /// Data directory (default: ~/Pastillas)
    #[arg(long, global = true, env = DATA_DIR_ENV, value_hint = clap::ValueHint::DirPath)]
    pub data_dir: Option<PathBuf>,

    /// Print results as JSON
    #[arg(long, global = true)]
    pub json: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Dosage reminders
    Reminder(ReminderArgs),
    /// Prescriptions (manual or uploaded)
    Prescription(PrescriptionArgs),
    /// Lab studies
    Lab(LabArgs),
    /// Pharmacy and literature search links
    Links {
        #[arg(required = true, num_args = 1..)]
        query: Vec<String>,
    },
    /// Run the reminder scheduler until interrupted
    Run {
        /// Seconds between ticks
        #[arg(long, default_value_t = TICK_INTERVAL.as_secs())]
        tick_secs: u64,
        /// Desktop notifier command line, e.g. "notify-send -u critical"
        #[arg(long, env = NOTIFY_CMD_ENV)]
        notify_cmd: Option<String>,
    },
}

#[derive(Debug, Args)]
pub struct ReminderArgs {
    #[command(subcommand)]
    pub command: ReminderCommand,
}

#[derive(Debug, Subcommand, PartialEq)]
pub enum ReminderCommand {
    Add {
        medication: String,
        #[arg(long)]
        dose: Option<String>,
        #[arg(long)]
        title: Option<String>,
        /// HH:MM, repeat for several times a day
        #[arg(long = "time", short = 't', required = true)]
        times: Vec<String>,
        /// Weekdays: all, lu-vi, none or codes such as lu,mi,vi
        #[arg(long, default_value = "all")]
        days: String,
        /// Days until the reminder expires (0 = never)
        #[arg(long, default_value_t = 0)]
        validity_days: u32,
        /// Create the reminder switched off
        #[arg(long)]
        disabled: bool,
    },
    List,
    Toggle {
        /// Reminder id or unique id prefix
        id: String,
    },
    Delete {
        id: String,
    },
}

#[derive(Debug, Args)]
pub struct PrescriptionArgs {
    #[command(subcommand)]
    pub command: PrescriptionCommand,
}

#[derive(Debug, Args, PartialEq, Default)]
pub struct PrescriptionMetaArgs {
    #[arg(long)]
    pub doctor: Option<String>,
    #[arg(long)]
    pub clinic: Option<String>,
    /// Free text, e.g. "30 días"
    #[arg(long)]
    pub validity: Option<String>,
}

#[derive(Debug, Subcommand, PartialEq)]
pub enum PrescriptionCommand {
    /// Enter a prescription by hand
    Add {
        /// Issue date, YYYY-MM-DD
        #[arg(long)]
        date: NaiveDate,
        #[command(flatten)]
        meta: PrescriptionMetaArgs,
        /// name=..,dose=..,regimen=daily|weekly|monthly,times=N,days=..,weekday=..,day=N,auto
        #[arg(long = "med", short = 'm', required = true)]
        medications: Vec<String>,
    },
    /// Store a prescription document (PDF or image)
    Upload {
        #[arg(value_hint = clap::ValueHint::FilePath)]
        file: PathBuf,
        #[arg(long)]
        date: Option<NaiveDate>,
        #[command(flatten)]
        meta: PrescriptionMetaArgs,
    },
    List,
    Delete {
        id: String,
    },
}

#[derive(Debug, Args)]
pub struct LabArgs {
    #[command(subcommand)]
    pub command: LabCommand,
}

#[derive(Debug, Subcommand, PartialEq)]
pub enum LabCommand {
    Upload {
        #[arg(value_hint = clap::ValueHint::FilePath)]
        file: PathBuf,
        #[arg(long = "type")]
        study_type: Option<String>,
        #[arg(long)]
        lab: Option<String>,
        #[arg(long)]
        date: Option<NaiveDate>,
    },
    List,
    Delete {
        id: String,
    },
    /// Write the stored file back to disk
    Export {
        id: String,
        #[arg(long, default_value = ".", value_hint = clap::ValueHint::DirPath)]
        dest: PathBuf,
    },
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn parses_reminder_add() {
        let cli = Cli::try_parse_from([
            "pastillas", "reminder", "add", "Paracetamol", "-t", "08:00", "-t", "20:00", "--days", "lu-vi",
        ])
        .unwrap();
        let Command::Reminder(args) = cli.command else {
            panic!("expected reminder command");
        };
        assert_eq!(
            args.command,
            ReminderCommand::Add {
                medication: "Paracetamol".into(),
                dose: None,
                title: None,
                times: vec!["08:00".into(), "20:00".into()],
                days: "lu-vi".into(),
                validity_days: 0,
                disabled: false,
            }
        );
    }

    #[test]
    fn reminder_add_requires_a_time() {
        assert!(Cli::try_parse_from(["pastillas", "reminder", "add", "X"]).is_err());
    }

    #[test]
    fn parses_prescription_add() {
        let cli = Cli::try_parse_from([
            "pastillas",
            "prescription",
            "add",
            "--date",
            "2026-04-10",
            "--doctor",
            "Dra. Soto",
            "-m",
            "name=Metformina,times=2,auto",
        ])
        .unwrap();
        let Command::Prescription(args) = cli.command else {
            panic!("expected prescription command");
        };
        let PrescriptionCommand::Add { date, meta, medications } = args.command else {
            panic!("expected add");
        };
        assert_eq!(date, NaiveDate::from_ymd_opt(2026, 4, 10).unwrap());
        assert_eq!(meta.doctor.as_deref(), Some("Dra. Soto"));
        assert_eq!(medications, vec!["name=Metformina,times=2,auto".to_string()]);
    }

    #[test]
    fn parses_run_and_global_flags() {
        let cli = Cli::try_parse_from([
            "pastillas", "run", "--tick-secs", "5", "--data-dir", "/tmp/p", "--json",
        ])
        .unwrap();
        assert_eq!(cli.data_dir, Some(PathBuf::from("/tmp/p")));
        assert!(cli.json);
        let Command::Run { tick_secs, .. } = cli.command else {
            panic!("expected run");
        };
        assert_eq!(tick_secs, 5);
    }
}
