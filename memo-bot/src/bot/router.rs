use std::collections::HashMap;

use tokio::sync::Mutex;

use crate::{
    notes::{render_export, ExportFormat, NoteStore, ValidationError, EXPORT_FILENAME},
    Error, Result,
};

use super::{args, reply, Command, InboundEvent, Reply};

pub struct CommandRouterBuilder {
    store: NoteStore,
    export_format: ExportFormat,
    commands: HashMap<String, Command>,
}

impl CommandRouterBuilder {
    /// Binds `name` to `command`. A name can only be bound once.
    pub fn register(mut self, name: impl Into<String>, command: Command) -> Result<Self> {
        let name = name.into();
        if self.commands.contains_key(&name) {
            return Err(Error::DuplicateCommand(name));
        }
        self.commands.insert(name, command);
        Ok(self)
    }

    pub fn export_format(mut self, export_format: ExportFormat) -> Self {
        self.export_format = export_format;
        self
    }

    pub fn build(self) -> CommandRouter {
        CommandRouter {
            store: self.store,
            export_format: self.export_format,
            commands: self.commands,
            dispatching: Mutex::new(()),
        }
    }
}

/// Maps inbound commands to note store calls and formats the replies.
///
/// Events are dispatched one at a time; a second event waits until the
/// first one has its reply.
pub struct CommandRouter {
    store: NoteStore,
    export_format: ExportFormat,
    commands: HashMap<String, Command>,
    dispatching: Mutex<()>,
}

impl CommandRouter {
    pub fn builder(store: NoteStore) -> CommandRouterBuilder {
        CommandRouterBuilder {
            store,
            export_format: ExportFormat::default(),
            commands: HashMap::new(),
        }
    }

    pub fn with_default_commands(store: NoteStore, export_format: ExportFormat) -> Result<Self> {
        let builder = Command::ALL
            .into_iter()
            .try_fold(Self::builder(store), |builder, command| builder.register(command.name(), command))?;
        Ok(builder.export_format(export_format).build())
    }

    pub fn store(&self) -> &NoteStore {
        &self.store
    }

    /// Storage failures are returned as errors; everything else, including bad
    /// arguments and unknown commands, becomes a reply.
    pub async fn route(&self, event: &InboundEvent) -> Result<Reply> {
        let Some(&command) = self.commands.get(&event.command) else {
            tracing::debug!(command = %event.command, "unrecognized command");
            return Ok(reply::unrecognized());
        };

        let _dispatching = self.dispatching.lock().await;
        match self.dispatch(command, event).await {
            Err(Error::Validation(error)) => {
                tracing::info!(%error, command = command.name(), "rejected command arguments");
                Ok(reply::usage(command))
            }
            result => result,
        }
    }

    async fn dispatch(&self, command: Command, event: &InboundEvent) -> Result<Reply> {
        let owner_id = event.owner_id;
        let args = event.args.as_slice();

        match command {
            Command::Start | Command::Help => Ok(reply::welcome()),
            Command::Save => {
                let Some((tag, text)) = args::tag_and_text(args) else {
                    return Ok(reply::usage(command));
                };
                self.store.save(owner_id, tag, &text).await?;
                Ok(reply::saved(tag))
            }
            Command::View => match args::first(args) {
                Some(tag) => {
                    let contents = self.store.list_by_tag(owner_id, tag).await?;
                    Ok(reply::tag_notes(tag, &contents))
                }
                None => Ok(reply::notes(&self.store.list(owner_id).await?)),
            },
            Command::Search => {
                let keyword = args::text(args).ok_or(ValidationError::EmptyKeyword)?;
                Ok(reply::search_results(&self.store.search(owner_id, &keyword).await?))
            }
            Command::Delete => {
                let Some(tag) = args::first(args) else {
                    return Ok(reply::usage(command));
                };
                let deleted = self.store.delete_by_tag(owner_id, tag).await?;
                Ok(reply::deleted(tag, deleted))
            }
            Command::Clear => Ok(reply::cleared(self.store.delete_all(owner_id).await?)),
            Command::Export => {
                let groups = self.store.export_all(owner_id).await?;
                if groups.is_empty() {
                    return Ok(reply::nothing_to_export());
                }
                Ok(Reply::document(
                    EXPORT_FILENAME,
                    render_export(&groups, self.export_format),
                ))
            }
        }
    }
}
