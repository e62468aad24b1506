use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "cabinet", bin_name = "cabinet", version)]
#[command(about = "Personal records file cabinet", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,

    #[command(flatten)]
    pub options: GlobalOptions,
}

#[derive(Args, Debug, Default, Clone)]
pub struct GlobalOptions {
    /// Storage backend: memory or file
    #[arg(short, long, global = true, help_heading = "Options")]
    pub storage: Option<String>,

    /// Validation ruleset: default or custom
    #[arg(short = 'v', long, global = true, help_heading = "Options")]
    pub validation_rules: Option<String>,

    /// JSON file with rule sections overriding the presets
    #[arg(long, global = true, help_heading = "Options")]
    pub rules_file: Option<PathBuf>,

    /// Slot file used by the file backend
    #[arg(long, global = true, help_heading = "Options")]
    pub data_file: Option<PathBuf>,

    /// Log the duration of every store call
    #[arg(long, global = true, help_heading = "Options")]
    pub use_stopwatch: bool,

    /// Log every store call with its arguments and result to cabinet.log
    #[arg(long, global = true, help_heading = "Options")]
    pub use_logger: bool,

    /// Directory holding cabinet.json
    #[arg(long, global = true, help_heading = "Options")]
    pub config_dir: Option<PathBuf>,
}

/// Field values for create and edit.
#[derive(Args, Debug, Clone)]
pub struct FieldArgs {
    #[arg(long)]
    pub first_name: String,

    #[arg(long)]
    pub last_name: String,

    /// yyyy-mm-dd or MM/dd/yyyy
    #[arg(long)]
    pub date_of_birth: String,

    #[arg(long)]
    pub age: String,

    #[arg(long)]
    pub salary: String,

    #[arg(long)]
    pub gender: String,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Add a record
    Create {
        #[command(flatten)]
        fields: FieldArgs,
    },

    /// Replace every field of an existing record
    Edit {
        /// Record id, with or without a leading '#'
        id: String,

        #[command(flatten)]
        fields: FieldArgs,
    },

    /// Remove a record
    Remove { id: String },

    /// List all records
    #[command(alias = "ls")]
    List,

    /// Find records by firstname, lastname or dateofbirth
    Find { field: String, value: String },

    /// Remove every record matching a condition: delete where lastname='Doe'
    Delete {
        #[arg(required = true, trailing_var_arg = true, allow_hyphen_values = true)]
        query: Vec<String>,
    },

    /// Change matching records: update set age=40 where firstname='John'
    Update {
        #[arg(required = true, trailing_var_arg = true, allow_hyphen_values = true)]
        query: Vec<String>,
    },

    /// Show chosen columns of matching records: select id, lastname where age=40
    Select {
        #[arg(trailing_var_arg = true, allow_hyphen_values = true)]
        query: Vec<String>,
    },

    /// Show live and deleted record counts
    Stat,

    /// Reclaim the space of removed records
    Purge,

    /// Write all records to a csv or xml file
    Export {
        path: PathBuf,

        /// csv or xml; guessed from the extension when omitted
        #[arg(short, long)]
        format: Option<String>,

        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },

    /// Load records from a csv or xml file
    Import {
        path: PathBuf,

        #[arg(short, long)]
        format: Option<String>,
    },

    /// Write random valid records to a csv or xml file
    Generate {
        path: PathBuf,

        #[arg(short, long)]
        format: Option<String>,

        #[arg(long, default_value_t = 1)]
        start_id: u32,

        #[arg(long, default_value_t = 10)]
        count: usize,
    },
}

impl Commands {
    pub fn name(&self) -> &'static str {
        match self {
            Commands::Create { .. } => "create",
            Commands::Edit { .. } => "edit",
            Commands::Remove { .. } => "remove",
            Commands::List => "list",
            Commands::Find { .. } => "find",
            Commands::Delete { .. } => "delete",
            Commands::Update { .. } => "update",
            Commands::Select { .. } => "select",
            Commands::Stat => "stat",
            Commands::Purge => "purge",
            Commands::Export { .. } => "export",
            Commands::Import { .. } => "import",
            Commands::Generate { .. } => "generate",
        }
    }
}

/// One line typed into the interactive shell.
#[derive(Parser, Debug)]
#[command(name = "cabinet", no_binary_name = true, disable_version_flag = true)]
pub struct ShellLine {
    #[command(subcommand)]
    pub command: Commands,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_consistent() {
        Cli::command().debug_assert();
        ShellLine::command().debug_assert();
    }

    #[test]
    fn parses_create_with_global_flags() {
        let cli = Cli::try_parse_from([
            "cabinet",
            "--storage",
            "memory",
            "create",
            "--first-name",
            "Jane",
            "--last-name",
            "Doe",
            "--date-of-birth",
            "1990-05-01",
            "--age",
            "33",
            "--salary",
            "50000.00",
            "--gender",
            "F",
            "--use-stopwatch",
        ])
        .unwrap();

        assert_eq!(cli.options.storage.as_deref(), Some("memory"));
        assert!(cli.options.use_stopwatch);
        match cli.command {
            Some(Commands::Create { fields }) => {
                assert_eq!(fields.first_name, "Jane");
                assert_eq!(fields.salary, "50000.00");
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn no_subcommand_means_shell() {
        let cli = Cli::try_parse_from(["cabinet"]).unwrap();
        assert!(cli.command.is_none());
    }

    #[test]
    fn shell_line_has_no_binary_name() {
        let line = ShellLine::try_parse_from(["find", "lastname", "Doe"]).unwrap();
        match line.command {
            Commands::Find { field, value } => {
                assert_eq!(field, "lastname");
                assert_eq!(value, "Doe");
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn query_words_are_collected() {
        let line =
            ShellLine::try_parse_from(["update", "set", "age=-1", "where", "id=2"]).unwrap();
        match line.command {
            Commands::Update { query } => assert_eq!(query.join(" "), "set age=-1 where id=2"),
            other => panic!("unexpected command: {:?}", other),
        }
        assert!(ShellLine::try_parse_from(["delete"]).is_err());
        assert!(matches!(
            ShellLine::try_parse_from(["select"]).unwrap().command,
            Commands::Select { query } if query.is_empty()
        ));
    }

    #[test]
    fn generate_defaults() {
        let line = ShellLine::try_parse_from(["generate", "out.csv"]).unwrap();
        match line.command {
            Commands::Generate {
                start_id, count, ..
            } => {
                assert_eq!(start_id, 1);
                assert_eq!(count, 10);
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }
}
