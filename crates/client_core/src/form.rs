//! Create/edit form state machine.

use shared::domain::{DraftRecord, UserField, UserId, UserRecord};
use tracing::debug;

use crate::{
    error::{OperationContext, SyncError},
    resource::UserResource,
    store::{CollectionStore, Reconciliation},
};

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum FormMode {
    #[default]
    Create,
    Edit(UserId),
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FormController {
    mode: FormMode,
    draft: DraftRecord,
}

impl FormController {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn mode(&self) -> &FormMode {
        &self.mode
    }

    pub fn draft(&self) -> &DraftRecord {
        &self.draft
    }

    /// Also cancels an edit in progress.
    pub fn start_create(&mut self) {
        self.mode = FormMode::Create;
        self.draft = DraftRecord::default();
    }

    pub fn start_edit(&mut self, record: &UserRecord) {
        debug!(user_id = %record.id, "editing user");
        self.mode = FormMode::Edit(record.id.clone());
        self.draft = record.to_draft();
    }

    pub fn update_field(&mut self, field: UserField, value: impl Into<String>) {
        self.draft.set(field, value);
    }

    /// The request the current mode and draft call for. The form itself is
    /// left untouched until [`FormController::finish_submit`].
    pub fn submission(&self) -> Submission {
        match &self.mode {
            FormMode::Create => Submission::Create {
                draft: self.draft.clone(),
            },
            FormMode::Edit(id) => Submission::Update {
                id: id.clone(),
                draft: self.draft.clone(),
            },
        }
    }

    /// Resets to an empty create form once the server has confirmed.
    pub fn finish_submit(&mut self) {
        self.start_create();
    }

    /// Sends the draft and reconciles the confirmed result into `store`.
    /// On failure the mode and draft are kept so no input is lost.
    pub async fn submit(
        &mut self,
        client: &dyn UserResource,
        store: &mut CollectionStore,
    ) -> Result<(), SyncError> {
        let reconciliation = self.submission().send(client).await?;
        reconciliation.apply(store);
        self.finish_submit();
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Submission {
    Create { draft: DraftRecord },
    Update { id: UserId, draft: DraftRecord },
}

impl Submission {
    pub fn context(&self) -> OperationContext {
        match self {
            Submission::Create { .. } => OperationContext::Create,
            Submission::Update { .. } => OperationContext::Update,
        }
    }

    pub async fn send(self, client: &dyn UserResource) -> Result<Reconciliation, SyncError> {
        match self {
            Submission::Create { draft } => {
                let record = client.create(&draft).await?;
                Ok(Reconciliation::Inserted(record))
            }
            Submission::Update { id, draft } => {
                let record = client.update(&id, &draft).await?;
                Ok(Reconciliation::Updated { id, record })
            }
        }
    }
}

#[cfg(test)]
#[path = "tests/form_tests.rs"]
mod tests;
