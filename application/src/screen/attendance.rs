//! Attendance history and monthly report screens.

use itertools::Itertools as _;
use service::{
    domain::{class, user},
    query,
    read::{
        attendance::Params,
        report::{self, Month, Record, Summary},
    },
    Query as _,
};

use crate::{define_error, AsError, Context, Error};

/// Shows the attendance history visible to the signed-in user, narrowed by
/// the provided filters.
///
/// # Errors
///
/// If the history cannot be fetched, or the navigation guard doesn't allow
/// it.
pub async fn history(
    ctx: &Context,
    search: Option<String>,
    class: Option<class::Id>,
    student: Option<user::Id>,
) -> Result<(), Error> {
    _ = ctx.enter("/attendance-history")?;
    let history = ctx
        .service()
        .execute(query::attendance::History::by(Params {
            class_id: class,
            student_id: student,
        }))
        .await
        .map_err(AsError::into_error)?;

    if history.children().len() > 1 {
        for (n, child) in history.children().iter().enumerate() {
            println!("Child #{}: {}", n + 1, describe(&child.summary));
        }
        println!();
    }

    print_summary(&history.summary());
    print_records(&report::filter(
        history.records(),
        search.as_deref().unwrap_or_default(),
    ));
    Ok(())
}

/// Shows the monthly attendance report, of the current month unless
/// specified otherwise.
///
/// # Errors
///
/// If the month is invalid, the report cannot be fetched, or the navigation
/// guard doesn't allow it.
pub async fn monthly_report(
    ctx: &Context,
    year: Option<i32>,
    month: Option<u8>,
    search: Option<String>,
) -> Result<(), Error> {
    _ = ctx.enter("/monthly-report")?;

    let current = Month::current();
    let month = Month::new(
        year.unwrap_or(current.year()),
        month.unwrap_or(current.number()),
    )
    .ok_or(ReportError::InvalidMonth)?;

    let report = ctx
        .service()
        .execute(query::report::Monthly::by(month))
        .await
        .map_err(AsError::into_error)?;

    println!("{} {}", month.short_name(), month.year());
    print_summary(&report.summary);

    let days = report.daily_counts();
    if !days.is_empty() {
        println!();
        println!("Day  Present  Late  Absent");
        for day in days {
            let Summary {
                present,
                late,
                absent,
            } = day.summary;
            println!("{:>3}  {present:>7}  {late:>4}  {absent:>6}", day.day);
        }
    }

    print_records(&report::filter(
        &report.records,
        search.as_deref().unwrap_or_default(),
    ));
    Ok(())
}

/// Describes the provided [`Summary`] in a single line.
fn describe(summary: &Summary) -> String {
    format!(
        "{} attended (present {}, late {}, absent {})",
        summary.percentage(),
        summary.present,
        summary.late,
        summary.absent,
    )
}

/// Prints the provided [`Summary`].
fn print_summary(summary: &Summary) {
    println!("Overall: {}", describe(summary));
}

/// Prints the provided [`Record`]s as a table.
fn print_records(records: &[&Record]) {
    println!();
    if records.is_empty() {
        println!("No attendance records found.");
        return;
    }
    for r in records {
        let when = [r.class_date.as_deref(), r.scan_time.as_deref()]
            .into_iter()
            .flatten()
            .join(" ");
        let class = match &r.subject {
            Some(subject) => format!("{} ({subject})", r.class_name),
            None => r.class_name.clone(),
        };
        println!("{:<7} {when:<28} {class}", r.status);
    }
}

define_error! {
    enum ReportError {
        #[code = "INVALID_MONTH"]
        #[message = "Month must be in 1-12 range"]
        InvalidMonth,
    }
}
