//! Student QR code screen.

use service::{query, Query as _};

use crate::{AsError, Context, Error};

/// Shows the attendance QR code payload of the signed-in student, to be
/// rendered by any QR encoder.
///
/// # Errors
///
/// If the QR code cannot be fetched, or the navigation guard doesn't allow
/// it.
pub async fn show(ctx: &Context) -> Result<(), Error> {
    let session = ctx.enter("/student/qr")?;
    let qr = ctx
        .service()
        .execute(query::qr::Mine::mine())
        .await
        .map_err(AsError::into_error)?;

    println!("{}", session.display_name());
    let details = &qr.student;
    if let Some(roll) = &details.roll_number {
        println!("Roll number: {roll}");
    }
    if let (Some(grade), Some(section)) = (&details.grade, &details.section) {
        println!("Grade {grade}, section {section}");
    }
    println!();
    println!("QR payload: {}", qr.payload);
    println!("Show this code to your teacher to mark your attendance.");
    Ok(())
}
