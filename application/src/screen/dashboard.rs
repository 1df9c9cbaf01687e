//! Role dashboards and the navigation menu.

use itertools::Itertools as _;
use service::{
    domain::{ClassSession, Role},
    navigation::menu,
    query,
    read::dashboard::{Child, Schedule, Stats, UPCOMING_LIMIT},
    Query as _,
};

use crate::{AsError, Context, Error};

/// Shows the dashboard of the signed-in user.
///
/// # Errors
///
/// If the dashboard cannot be fetched, or the navigation guard doesn't
/// allow it.
pub async fn overview(ctx: &Context) -> Result<(), Error> {
    let session = ctx.enter_home()?;
    let dashboard = ctx
        .service()
        .execute(query::dashboard::Overview::mine())
        .await
        .map_err(AsError::into_error)?;

    println!("Welcome back, {}!", session.display_name().first());
    match session.role() {
        Role::Admin => {
            print_admin_stats(&dashboard.stats);
            println!();
            println!("Recent classes:");
            print_classes(&dashboard.recent_classes);
        }
        Role::Teacher => {
            println!("Classes taught: {}", dashboard.stats.total_classes);
            print_schedule(dashboard.schedule());
        }
        Role::Student => {
            print_attendance_stats(&dashboard.stats);
            print_schedule(dashboard.schedule());
        }
        Role::Parent => {
            if dashboard.children.is_empty() {
                println!("No children are linked to your account.");
            }
            for child in &dashboard.children {
                println!();
                print_child(child);
            }
        }
    }
    Ok(())
}

/// Shows the navigation menu of the signed-in user, marking the item of
/// the home screen as the active one.
///
/// # Errors
///
/// If the navigation guard doesn't allow the home screen.
pub fn menu(ctx: &Context) -> Result<(), Error> {
    let session = ctx.enter_home()?;
    let role = session.role();
    let home = role.home_path();

    println!(
        "{} ({}, {role})",
        session.display_name(),
        session.display_name().initials(),
    );
    for section in menu::for_role(role) {
        println!();
        println!("{}", section.title);
        for item in section.items {
            let marker = if item.is_active(&home, role) { '>' } else { ' ' };
            println!("{marker} {:<24} {}", item.label, item.path);
        }
    }
    Ok(())
}

/// Prints a single line describing the provided [`ClassSession`].
pub(crate) fn print_class(class: &ClassSession) {
    let details = [
        class.subject.as_deref(),
        class.room.as_deref(),
        class.teacher_name.as_deref(),
    ]
    .into_iter()
    .flatten()
    .join(", ");

    print!(
        "  #{:<5} {} {:<13} {:<10} {}",
        class.id,
        class.date,
        class.time_span(),
        class.status,
        class.name,
    );
    if !details.is_empty() {
        print!(" ({details})");
    }
    if class.total_students > 0 {
        print!(" {}/{} present", class.present_count, class.total_students);
    }
    if let Some(status) = class.my_attendance.or(class.child_attendance) {
        print!(" [{status}]");
    }
    println!();
}

/// Prints the provided [`ClassSession`]s, one per line.
pub(crate) fn print_classes(classes: &[ClassSession]) {
    if classes.is_empty() {
        println!("  No classes");
    }
    classes.iter().for_each(print_class);
}

/// Prints the ongoing, upcoming and last completed classes of the provided
/// [`Schedule`].
fn print_schedule(schedule: Schedule<'_>) {
    println!();
    match schedule.ongoing() {
        Some(class) => {
            println!("Now:");
            print_class(class);
        }
        None => println!("No class is taking place right now."),
    }

    let upcoming = schedule.upcoming(UPCOMING_LIMIT).collect::<Vec<_>>();
    if !upcoming.is_empty() {
        println!("Upcoming:");
        upcoming.into_iter().for_each(print_class);
    }

    if let Some(class) = schedule.last_completed() {
        println!("Last completed:");
        print_class(class);
    }
}

/// Prints the attendance numbers of the provided [`Stats`].
fn print_attendance_stats(stats: &Stats) {
    println!(
        "Attendance: {} (present {}, late {}, absent {}, total {})",
        stats.attendance_rate(),
        stats.present,
        stats.late,
        stats.absent,
        stats.total,
    );
}

/// Prints the school-wide numbers of the provided [`Stats`].
fn print_admin_stats(stats: &Stats) {
    println!(
        "Teachers: {}, students: {}, classes today: {}",
        stats.teachers, stats.students, stats.classes,
    );
    println!(
        "Today: {} present, {} absent",
        stats.today_present, stats.today_absent,
    );
}

/// Prints the card of the provided [`Child`].
fn print_child(child: &Child) {
    let details = &child.info.details;
    let placement = [
        details.grade.as_deref().map(|g| format!("grade {g}")),
        details.section.as_deref().map(|s| format!("section {s}")),
        details.roll_number.as_deref().map(|r| format!("roll {r}")),
    ]
    .into_iter()
    .flatten()
    .join(", ");

    if placement.is_empty() {
        println!("{}", child.info.name);
    } else {
        println!("{} ({placement})", child.info.name);
    }
    print_attendance_stats(&child.stats);
    print_schedule(child.schedule());
}
