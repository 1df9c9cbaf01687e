//! [`Query`] collection related to the [`ClassSession`]s.

use common::operations::{By, Select};
use tracerr::Traced;

use crate::{
    domain::ClassSession,
    infra::{backend, Backend},
    Query, Service,
};

use super::BackendQuery;

/// Queries the [`ClassSession`]s visible to the signed-in user.
pub type List = BackendQuery<By<Vec<ClassSession>, ()>>;

/// Queries the ongoing [`ClassSession`]s, the only ones attendance can be
/// scanned into.
#[derive(Clone, Copy, Debug)]
pub struct Ongoing;

impl<Be> Query<Ongoing> for Service<Be>
where
    Be: Backend<
        Select<By<Vec<ClassSession>, ()>>,
        Ok = Vec<ClassSession>,
        Err = Traced<backend::Error>,
    >,
{
    type Ok = Vec<ClassSession>;
    type Err = Traced<backend::Error>;

    async fn execute(&self, _: Ongoing) -> Result<Self::Ok, Self::Err> {
        let mut classes = self
            .backend()
            .execute(Select(By::new(())))
            .await
            .map_err(tracerr::wrap!())?;
        classes.retain(ClassSession::is_ongoing);
        Ok(classes)
    }
}

#[cfg(test)]
mod spec {
    use common::operations::{By, Select};
    use tracerr::Traced;

    use crate::{
        domain::ClassSession,
        infra::{backend, Backend, MemoryStorage},
        scanner::spec::class,
        session, Service,
    };

    use super::Ongoing;

    #[derive(Debug)]
    struct Classes(Vec<ClassSession>);

    impl Backend<Select<By<Vec<ClassSession>, ()>>> for Classes {
        type Ok = Vec<ClassSession>;
        type Err = Traced<backend::Error>;

        async fn execute(
            &self,
            _: Select<By<Vec<ClassSession>, ()>>,
        ) -> Result<Self::Ok, Self::Err> {
            Ok(self.0.clone())
        }
    }

    #[tokio::test]
    async fn keeps_ongoing_classes_only() {
        let service = Service::new(
            Classes(vec![
                class(1, "completed"),
                class(2, "ongoing"),
                class(3, "upcoming"),
                class(4, "ongoing"),
            ]),
            session::Store::hydrate(MemoryStorage::new()),
        );

        let ongoing = service.execute(Ongoing).await.unwrap();

        assert_eq!(
            ongoing.iter().map(|c| c.id.get()).collect::<Vec<_>>(),
            [2, 4],
        );
    }
}
