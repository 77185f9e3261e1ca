use std::sync::Arc;

use crate::config::UserSyncConfig;
use crate::database::{DatabaseError, EventDispatcher, UserDirectory};
use crate::domain::{NewUser, User};
use crate::middleware::AuthUser;
use crate::sync::{CreateError, MaterializeError, Materializer, Presence};

/// Creates the local user record for an authenticated subject the first time
/// it is seen.
pub struct UserSync {
    directory: Arc<dyn UserDirectory>,
    dispatcher: Arc<dyn EventDispatcher>,
    materializer: Materializer<String>,
}

impl UserSync {
    pub fn new(
        directory: Arc<dyn UserDirectory>,
        dispatcher: Arc<dyn EventDispatcher>,
        config: &UserSyncConfig,
    ) -> Self {
        Self {
            directory,
            dispatcher,
            materializer: Materializer::new(
                config.present_ttl(),
                config.absent_ttl(),
                config.max_entries,
            ),
        }
    }

    pub async fn ensure(&self, user: &AuthUser) -> Result<Presence, MaterializeError<DatabaseError>> {
        let load = move || async move {
            self.directory
                .find_by_subject(&user.subject)
                .await
                .map(|found| found.is_some())
        };

        let create = move || async move {
            let (record, events) = User::register(NewUser {
                subject: user.subject.clone(),
                email: user.email.clone(),
                name: user.name.clone(),
            });

            match self.directory.insert(&record, &events).await {
                Ok(()) => {
                    self.dispatcher.dispatch(&events).await;
                    Ok(())
                }
                Err(DatabaseError::Duplicate(_)) => Err(CreateError::Duplicate),
                Err(e) => Err(CreateError::Other(e)),
            }
        };

        self.materializer.ensure(&user.subject, load, create).await
    }
}
