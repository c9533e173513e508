//! Command-line front end for the course enrollment client.
#![cfg_attr(not(any(test, doctest)), deny(clippy::unwrap_used))]
#![cfg_attr(not(any(test, doctest)), deny(clippy::expect_used))]

use std::ffi::OsString;
use std::io::{self, Write};
use std::path::PathBuf;
use std::sync::Arc;

use clap::{Parser, Subcommand};
use enrollment_client::domain::{
    AcademicTerm, DEFAULT_ACADEMIC_YEAR, EnrollRequest, LoginAccount, LoginCredentials,
    ProfileUpdate, Registration, Role, Semester,
};
use enrollment_client::outbound::http::ReqwestTransport;
use enrollment_client::outbound::notify::ConsoleNotifier;
use enrollment_client::{ClientServices, ClientSettings};
use ortho_config::OrthoConfig;
use serde::Serialize;
use tokio::runtime::Builder;
use tracing::{debug, warn};
use tracing_subscriber::{EnvFilter, fmt};

type Services = ClientServices<ReqwestTransport>;

/// `enroll` command arguments.
#[derive(Debug, Parser)]
#[command(
    name = "enroll",
    about = "Browse courses and manage enrollments against the enrollment API",
    version
)]
struct CliArgs {
    /// API root, e.g. `http://localhost:8080/api`.
    #[arg(long, global = true, value_name = "url")]
    base_url: Option<String>,
    /// Request timeout in milliseconds.
    #[arg(long, global = true, value_name = "ms")]
    timeout_ms: Option<u64>,
    /// Directory holding the persisted session.
    #[arg(long, global = true, value_name = "path")]
    storage_dir: Option<PathBuf>,
    /// Emit logs as JSON.
    #[arg(long, global = true)]
    json_logs: bool,
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Sign in with a student number, staff number or email.
    Login {
        #[arg(long, group = "account")]
        student_id: Option<String>,
        #[arg(long, group = "account")]
        teacher_id: Option<String>,
        #[arg(long, group = "account")]
        email: Option<String>,
        #[arg(long)]
        password: String,
    },
    /// Create an account.
    Register {
        #[arg(long)]
        name: String,
        #[arg(long)]
        email: String,
        #[arg(long)]
        password: String,
        /// STUDENT, TEACHER or ADMIN.
        #[arg(long)]
        role: Role,
        /// Student or staff number.
        #[arg(long)]
        identifier: Option<String>,
        #[arg(long)]
        phone: Option<String>,
    },
    /// Sign out and forget the stored session.
    Logout,
    /// Show the signed-in user.
    Whoami,
    /// List every course.
    Courses,
    /// List the classes of one course.
    Classes { course_id: i64 },
    /// Show one class.
    Class { class_id: i64 },
    /// List classes open for enrollment.
    Available {
        #[arg(long, default_value_t = DEFAULT_ACADEMIC_YEAR)]
        year: u16,
        #[arg(long, default_value = "first")]
        semester: Semester,
    },
    /// List courses available to the signed-in student.
    StudentCourses,
    /// List the signed-in student's enrollments.
    Enrollments {
        #[arg(long, requires = "semester")]
        year: Option<u16>,
        #[arg(long, requires = "year")]
        semester: Option<Semester>,
    },
    /// Enroll in a class.
    Enroll { class_id: i64 },
    /// Drop a class.
    Drop { class_id: i64 },
    /// Check a class against the timetable.
    CheckConflict { class_id: i64 },
    /// Check whether an email is already registered.
    CheckEmail { email: String },
    /// Check whether a student number is taken.
    CheckStudentId { student_id: String },
    /// Check whether a staff number is taken.
    CheckTeacherId { teacher_id: String },
    /// Show or edit the signed-in user's profile.
    Profile {
        #[command(subcommand)]
        action: Option<ProfileAction>,
    },
    /// Run the navigation guard for a path.
    Navigate { path: String },
    /// Probe the server.
    Health {
        /// Probe the database instead.
        #[arg(long)]
        database: bool,
    },
}

#[derive(Debug, Subcommand)]
enum ProfileAction {
    Show,
    Update {
        #[arg(long)]
        name: Option<String>,
        #[arg(long)]
        email: Option<String>,
        #[arg(long)]
        phone: Option<String>,
    },
}

impl Command {
    /// Page the command stands in for; the guard must admit it first.
    fn route(&self) -> Option<&'static str> {
        match self {
            Self::Courses
            | Self::Classes { .. }
            | Self::Class { .. }
            | Self::Available { .. }
            | Self::StudentCourses
            | Self::Enroll { .. }
            | Self::Drop { .. }
            | Self::CheckConflict { .. } => Some("/dashboard/student/courses"),
            Self::Enrollments { .. } => Some("/dashboard/student/enrollments"),
            Self::Profile { .. } => Some("/dashboard/profile"),
            Self::Whoami => Some("/dashboard"),
            _ => None,
        }
    }
}

fn main() -> io::Result<()> {
    let runtime = Builder::new_current_thread()
        .enable_all()
        .build()
        .map_err(|error| io::Error::other(format!("create Tokio runtime: {error}")))?;
    runtime.block_on(async_main())
}

async fn async_main() -> io::Result<()> {
    let args = CliArgs::try_parse().map_err(io::Error::other)?;
    init_tracing(args.json_logs);

    let settings = load_settings(&args)?;
    let services = ClientServices::from_settings(&settings, Arc::new(ConsoleNotifier))
        .map_err(|error| io::Error::other(format!("initialise client: {error}")))?;

    let restored = services.session_store.restore().map_err(io::Error::other)?;
    debug!(restored, "session restored");

    if let Some(route) = args.command.route() {
        let outcome = services.router.navigate(route);
        if outcome.was_redirected() {
            return Err(io::Error::other(format!(
                "cannot open {route}; redirected to {}",
                outcome.route.path
            )));
        }
    }

    run(&services, args.command).await
}

fn init_tracing(json: bool) {
    let builder = fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(io::stderr);
    let result = if json {
        builder.json().try_init()
    } else {
        builder.try_init()
    };
    if let Err(e) = result {
        warn!(error = %e, "tracing init failed");
    }
}

fn load_settings(args: &CliArgs) -> io::Result<ClientSettings> {
    let mut settings = ClientSettings::load_from_iter([OsString::from("enroll")])
        .map_err(|error| io::Error::other(format!("load settings: {error}")))?;
    if let Some(base_url) = &args.base_url {
        settings.base_url = Some(base_url.clone());
    }
    if let Some(timeout_ms) = args.timeout_ms {
        settings.timeout_ms = Some(timeout_ms);
    }
    if let Some(storage_dir) = &args.storage_dir {
        settings.storage_dir = Some(storage_dir.clone());
    }
    Ok(settings)
}

async fn run(services: &Services, command: Command) -> io::Result<()> {
    let api = &services.api;
    match command {
        Command::Login {
            student_id,
            teacher_id,
            email,
            password,
        } => {
            let account = match (student_id, teacher_id, email) {
                (Some(id), _, _) => LoginAccount::StudentId(id),
                (_, Some(id), _) => LoginAccount::TeacherId(id),
                (_, _, Some(email)) => LoginAccount::Email(email),
                _ => {
                    return Err(io::Error::other(
                        "one of --student-id, --teacher-id or --email is required",
                    ));
                }
            };
            let credentials =
                LoginCredentials::try_new(account, &password).map_err(io::Error::other)?;
            services
                .session_store
                .login(&credentials)
                .await
                .map_err(io::Error::other)?;
            let outcome = services.router.navigate("/login");
            print_line(&format!("now at {}", outcome.route.path))
        }
        Command::Register {
            name,
            email,
            password,
            role,
            identifier,
            phone,
        } => {
            let mut registration =
                Registration::try_new(&name, &email, &password, role, identifier.as_deref())
                    .map_err(io::Error::other)?;
            if let Some(phone) = phone {
                registration = registration.with_phone(phone);
            }
            services
                .session_store
                .register(&registration)
                .await
                .map_err(io::Error::other)
        }
        Command::Logout => {
            services.session_store.logout().await;
            Ok(())
        }
        Command::Whoami => {
            let session = services.session_store.session();
            print_json(&session.identity())
        }
        Command::Courses => {
            services.courses.fetch_courses().await.map_err(io::Error::other)?;
            print_json(&services.courses.courses())
        }
        Command::Classes { course_id } => {
            let classes = api
                .get_classes_by_course(course_id)
                .await
                .map_err(io::Error::other)?;
            print_json(&classes)
        }
        Command::Class { class_id } => {
            let class = api
                .get_class_details(class_id)
                .await
                .map_err(io::Error::other)?;
            print_json(&class)
        }
        Command::Available { year, semester } => {
            services
                .courses
                .fetch_available_classes(&AcademicTerm::new(year, semester))
                .await
                .map_err(io::Error::other)?;
            print_json(&services.courses.available_classes())
        }
        Command::StudentCourses => {
            let courses = api
                .get_student_available_courses()
                .await
                .map_err(io::Error::other)?;
            print_json(&courses)
        }
        Command::Enrollments { year, semester } => {
            let student_id = signed_in_id(services);
            if let (Some(year), Some(semester)) = (year, semester) {
                let term = AcademicTerm::new(year, semester);
                let enrollments = api
                    .get_enrollments_by_semester(&student_id, &term)
                    .await
                    .map_err(io::Error::other)?;
                return print_json(&enrollments);
            }
            services
                .courses
                .fetch_my_enrollments(&student_id)
                .await
                .map_err(io::Error::other)?;
            print_json(&services.courses.enrollments())
        }
        Command::Enroll { class_id } => {
            let request = EnrollRequest::new(signed_in_id(services), class_id);
            services
                .courses
                .enroll(&request)
                .await
                .map_err(io::Error::other)?;
            print_json(&services.courses.enrollments())
        }
        Command::Drop { class_id } => {
            services
                .courses
                .drop_course(&signed_in_id(services), class_id)
                .await
                .map_err(io::Error::other)?;
            print_json(&services.courses.enrollments())
        }
        Command::CheckConflict { class_id } => {
            let report = api
                .check_conflict(&signed_in_id(services), class_id)
                .await
                .map_err(io::Error::other)?;
            print_json(&report)
        }
        Command::CheckEmail { email } => {
            let taken = api.check_email(&email).await.map_err(io::Error::other)?;
            print_taken("email", taken)
        }
        Command::CheckStudentId { student_id } => {
            let taken = api
                .check_student_id(&student_id)
                .await
                .map_err(io::Error::other)?;
            print_taken("student id", taken)
        }
        Command::CheckTeacherId { teacher_id } => {
            let taken = api
                .check_teacher_id(&teacher_id)
                .await
                .map_err(io::Error::other)?;
            print_taken("teacher id", taken)
        }
        Command::Profile { action } => run_profile(services, action).await,
        Command::Navigate { path } => {
            let outcome = services.router.navigate(&path);
            print_line(&format!(
                "{} -> {} ({})",
                outcome.requested, outcome.route.path, outcome.route.name
            ))
        }
        Command::Health { database } => {
            let report = if database {
                api.database_check().await
            } else {
                api.health_check().await
            }
            .map_err(io::Error::other)?;
            match report.message {
                Some(message) => print_line(&message)?,
                None => print_line("ok")?,
            }
            print_json(&report.detail)
        }
    }
}

async fn run_profile(services: &Services, action: Option<ProfileAction>) -> io::Result<()> {
    let user_id = signed_in_id(services);
    let store = &services.profile;
    match action.unwrap_or(ProfileAction::Show) {
        ProfileAction::Show => {
            store
                .fetch_profile(&user_id)
                .await
                .map_err(io::Error::other)?;
        }
        ProfileAction::Update { name, email, phone } => {
            let update = ProfileUpdate { name, email, phone };
            if update.is_empty() {
                return Err(io::Error::other(
                    "nothing to update; pass --name, --email or --phone",
                ));
            }
            store
                .update_profile(&user_id, &update)
                .await
                .map_err(io::Error::other)?;
        }
    }
    print_json(&store.profile())
}

fn signed_in_id(services: &Services) -> String {
    services.session_store.session().user_id().to_owned()
}

fn print_taken(what: &str, taken: bool) -> io::Result<()> {
    let verdict = if taken { "already registered" } else { "available" };
    print_line(&format!("{what}: {verdict}"))
}

fn print_line(line: &str) -> io::Result<()> {
    writeln!(io::stdout().lock(), "{line}")
}

fn print_json<T: Serialize>(value: &T) -> io::Result<()> {
    let rendered = serde_json::to_string_pretty(value).map_err(io::Error::other)?;
    print_line(&rendered)
}
