//! [`Args`] definitions.

use clap::{Parser, Subcommand};
use service::domain::{class, user, Role};

/// Terminal client of the school attendance platform.
#[derive(Debug, Parser)]
#[command(version, about, long_about = None)]
pub struct Args {
    /// Path to the configuration file.
    #[arg(short, long, default_value = "config.toml")]
    pub config: String,

    /// Screen to open.
    #[command(subcommand)]
    pub screen: Screen,
}

impl Args {
    /// Parses command line arguments.
    ///
    /// # Errors
    ///
    /// Errors if failed to parse command line arguments.
    pub fn parse() -> Result<Self, clap::Error> {
        <Self as Parser>::try_parse()
    }
}

/// Screen of the client.
#[derive(Debug, Subcommand)]
pub enum Screen {
    /// Signs in with an email and a password.
    Login {
        /// Email of the user.
        #[arg(long)]
        email: user::Email,

        /// Password of the user, read from the standard input if omitted.
        #[arg(long, env = "ATTENDANCE_PASSWORD", hide_env_values = true)]
        password: Option<String>,
    },

    /// Signs out, forgetting the persisted session.
    Logout,

    /// Shows the signed-in user.
    Whoami,

    /// Changes the password of the signed-in user, reading the passwords
    /// from the standard input.
    ChangePassword,

    /// Recovers a forgotten password with a code sent by email.
    ForgotPassword {
        /// Email of the user.
        #[arg(long)]
        email: user::Email,
    },

    /// Shows the dashboard of the signed-in user.
    Dashboard,

    /// Shows the navigation menu of the signed-in user.
    Menu,

    /// Shows the attendance history.
    Attendance {
        /// Keeps only records whose class name or subject contain the text.
        #[arg(long)]
        search: Option<String>,

        /// Keeps only records of the class.
        #[arg(long)]
        class: Option<class::Id>,

        /// Keeps only records of the student.
        #[arg(long)]
        student: Option<user::Id>,
    },

    /// Shows the monthly attendance report.
    Report {
        /// Year of the report, the current one by default.
        #[arg(long)]
        year: Option<i32>,

        /// Month (1-12) of the report, the current one by default.
        #[arg(long)]
        month: Option<u8>,

        /// Keeps only records whose class name or subject contain the text.
        #[arg(long)]
        search: Option<String>,
    },

    /// Manages the platform users.
    Users {
        /// Action to perform.
        #[command(subcommand)]
        action: UsersAction,
    },

    /// Manages the student records.
    Students {
        /// Action to perform.
        #[command(subcommand)]
        action: StudentsAction,
    },

    /// Manages the classes.
    Classes {
        /// Action to perform.
        #[command(subcommand)]
        action: ClassesAction,
    },

    /// Shows the QR code payload of the signed-in student.
    Qr,

    /// Scans the attendance QR codes into an ongoing class.
    Scan {
        /// Class to scan into, required if several classes are ongoing.
        #[arg(long)]
        class: Option<class::Id>,
    },
}

/// Action of the [`Screen::Users`].
#[derive(Debug, Subcommand)]
pub enum UsersAction {
    /// Lists the users having the role.
    List {
        /// Role of the listed users.
        role: Role,
    },

    /// Registers a new user.
    Register(Registration),

    /// Deletes the user.
    Delete {
        /// ID of the user to delete.
        id: user::Id,
    },
}

/// Form of a new user.
#[derive(Debug, clap::Args)]
pub struct Registration {
    /// Role of the new user.
    #[arg(long)]
    pub role: Role,

    /// Full name of the new user.
    #[arg(long)]
    pub name: user::Name,

    /// Email of the new user.
    #[arg(long)]
    pub email: user::Email,

    /// Phone number of the new user.
    #[arg(long)]
    pub phone: Option<String>,

    /// Date of birth (`YYYY-MM-DD`) of the new user.
    #[arg(long)]
    pub dob: String,

    /// Student details of the new user.
    #[command(flatten)]
    pub details: StudentDetails,
}

/// Student-specific details of a user form.
#[derive(Debug, clap::Args)]
pub struct StudentDetails {
    /// Grade of the student.
    #[arg(long)]
    pub grade: Option<String>,

    /// Section of the student.
    #[arg(long)]
    pub section: Option<String>,

    /// Roll number of the student.
    #[arg(long)]
    pub roll_number: Option<String>,
}

/// Action of the [`Screen::Students`].
#[derive(Debug, Subcommand)]
pub enum StudentsAction {
    /// Updates the student record.
    Update {
        /// ID of the student.
        id: user::Id,

        /// New full name of the student.
        #[arg(long)]
        name: user::Name,

        /// New email of the student.
        #[arg(long)]
        email: user::Email,

        /// New phone number of the student.
        #[arg(long)]
        phone: Option<String>,

        /// New student details.
        #[command(flatten)]
        details: StudentDetails,
    },

    /// Deletes the student record along with its account.
    Delete {
        /// ID of the student.
        id: user::Id,
    },
}

/// Action of the [`Screen::Classes`].
#[derive(Debug, Subcommand)]
pub enum ClassesAction {
    /// Lists the classes.
    List,

    /// Schedules a new class.
    Create {
        /// Name of the class.
        #[arg(long)]
        name: String,

        /// Subject taught.
        #[arg(long)]
        subject: Option<String>,

        /// Date (`YYYY-MM-DD`) of the class.
        #[arg(long)]
        date: String,

        /// Start time (`HH:MM`).
        #[arg(long)]
        start: String,

        /// End time (`HH:MM`).
        #[arg(long)]
        end: String,

        /// Room the class takes place in.
        #[arg(long)]
        room: Option<String>,
    },
}
