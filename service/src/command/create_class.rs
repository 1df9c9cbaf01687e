//! [`Command`] for scheduling a new class.

use common::operations::Insert;
use derive_more::{Display, Error, From};
use time::{macros::format_description, Time};
use tracerr::Traced;
use tracing as log;

use crate::{
    domain::class,
    infra::{backend, Backend},
    Service,
};

use super::Command;

/// [`Command`] for scheduling a new class.
#[derive(Clone, Debug, From)]
pub struct CreateClass(pub class::New);

impl<Be> Command<CreateClass> for Service<Be>
where
    Be: Backend<Insert<class::New>, Ok = (), Err = Traced<backend::Error>>,
{
    type Ok = ();
    type Err = Traced<ExecutionError>;

    async fn execute(
        &self,
        CreateClass(mut class): CreateClass,
    ) -> Result<Self::Ok, Self::Err> {
        use ExecutionError as E;

        class.class_name = class.class_name.trim().to_owned();
        if class.class_name.is_empty() {
            return Err(tracerr::new!(E::EmptyName));
        }
        let start = parse_time(&class.start_time)
            .ok_or_else(|| tracerr::new!(E::InvalidTime))?;
        let end = parse_time(&class.end_time)
            .ok_or_else(|| tracerr::new!(E::InvalidTime))?;
        if start >= end {
            return Err(tracerr::new!(E::EndsBeforeStart));
        }

        let name = class.class_name.clone();
        self.backend()
            .execute(Insert(class))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?;
        log::info!("scheduled class `{name}`");
        Ok(())
    }
}

/// Parses the provided `HH:MM` (or `HH:MM:SS`) time of day.
fn parse_time(input: &str) -> Option<Time> {
    Time::parse(
        input.trim(),
        format_description!("[hour]:[minute][optional [:[second]]]"),
    )
    .ok()
}

/// Error of [`CreateClass`] [`Command`] execution.
#[derive(Debug, Display, Error, From)]
pub enum ExecutionError {
    /// Class name is empty.
    #[display("Class name is required")]
    EmptyName,

    /// Start or end time is not a valid `HH:MM` time.
    #[display("Class times must be in HH:MM format")]
    InvalidTime,

    /// Class doesn't end after it starts.
    #[display("Class must end after it starts")]
    EndsBeforeStart,

    /// [`Backend`] error.
    #[display("{_0}")]
    Backend(backend::Error),
}

#[cfg(test)]
mod spec {
    use super::parse_time;

    #[test]
    fn parses_clock_times() {
        assert!(parse_time("09:30").is_some());
        assert!(parse_time("09:30:00").is_some());
        assert!(parse_time("9.30").is_none());
        assert!(parse_time("25:00").is_none());
        assert!(parse_time("09:30") < parse_time("10:15"));
    }
}
