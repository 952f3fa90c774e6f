//! Chat commands, resolved through a static name table.

use serde::{Deserialize, Serialize};

use lookout_domain::{duration, format, ids, query};

use crate::{BoxFuture, Error, LookoutService};

/// An incoming chat message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
	pub author_id: String,
	pub channel_id: String,
	pub content: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Reply {
	pub channel_id: String,
	pub text: String,
}

pub trait Command
where
	Self: Send + Sync,
{
	fn name(&self) -> &'static str;

	fn help(&self) -> &'static str;

	/// Runs the command; `args` is the message text after the command name.
	fn execute<'a>(
		&'a self,
		service: &'a LookoutService,
		message: &'a Message,
		args: &'a str,
	) -> BoxFuture<'a, String>;
}

static COMMANDS: [&dyn Command; 6] = [
	&ActiveCommand,
	&CancelCommand,
	&GroupsCommand,
	&HelpCommand,
	&LookoutCommand,
	&ServersCommand,
];

pub fn commands() -> &'static [&'static dyn Command] {
	&COMMANDS
}

pub fn find(name: &str) -> Option<&'static dyn Command> {
	let name = name.to_lowercase();

	COMMANDS.iter().copied().find(|command| command.name() == name)
}

/// Runs the command named by `message`, or returns `None` when it is not a command.
pub async fn dispatch(service: &LookoutService, prefix: &str, message: &Message) -> Option<Reply> {
	let body = message.content.trim_start().strip_prefix(prefix)?;
	let body = body.trim_start();
	let (name, args) = match body.split_once(char::is_whitespace) {
		Some((name, args)) => (name, args.trim()),
		None => (body, ""),
	};
	let command = find(name)?;

	tracing::debug!(
		command = command.name(),
		author_id = %message.author_id,
		"Running command."
	);

	let text = command.execute(service, message, args).await;

	Some(Reply { channel_id: message.channel_id.clone(), text })
}

struct ActiveCommand;
impl Command for ActiveCommand {
	fn name(&self) -> &'static str {
		"active"
	}

	fn help(&self) -> &'static str {
		"*[prefix]active*\n\nReturns the user's active queries.\nEx: `lo!active`"
	}

	fn execute<'a>(
		&'a self,
		service: &'a LookoutService,
		message: &'a Message,
		_: &'a str,
	) -> BoxFuture<'a, String> {
		Box::pin(async move {
			let stored = match service.list_queries(&message.author_id).await {
				Ok(stored) => stored,
				Err(err) => {
					tracing::error!(
						error = %err,
						author_id = %message.author_id,
						"Failed to list queries."
					);

					return "There was a problem retrieving your queries.".to_string();
				},
			};

			if stored.is_empty() {
				return "No active queries found.".to_string();
			}

			let lines: Vec<_> = stored
				.iter()
				.map(|query| format::query_line(query.id, &query.query_text, query.ttl))
				.collect();

			format!("**Queries**\n\n{}", lines.join("\n\n"))
		})
	}
}

struct CancelCommand;
impl Command for CancelCommand {
	fn name(&self) -> &'static str {
		"cancel"
	}

	fn help(&self) -> &'static str {
		"*[prefix]cancel [query id]*\n\n\
		 Cancels a user's query of the specified ID.\n\
		 Ex: `lo!cancel 00F`"
	}

	fn execute<'a>(
		&'a self,
		service: &'a LookoutService,
		message: &'a Message,
		args: &'a str,
	) -> BoxFuture<'a, String> {
		Box::pin(async move {
			let Some(text) = args.split_whitespace().last() else {
				return "No query ID found.".to_string();
			};
			let Ok(id) = ids::parse(text) else {
				return format!("The ID {text} is not within an acceptable range.");
			};

			match service.cancel_query(&message.author_id, id).await {
				Ok(()) => format!("Query {id:X} was canceled."),
				Err(Error::NotFound { .. }) => format!("No active query with ID {id:X} was found."),
				Err(err) => {
					tracing::error!(
						error = %err,
						author_id = %message.author_id,
						id,
						"Failed to cancel query."
					);

					"There was a problem trying to delete that query.".to_string()
				},
			}
		})
	}
}

struct GroupsCommand;
impl Command for GroupsCommand {
	fn name(&self) -> &'static str {
		"groups"
	}

	fn help(&self) -> &'static str {
		"*[prefix]groups [server]*\n\n\
		 Returns a list of current groups in the specified server.\n\
		 Ex: `lo!groups Cannith`"
	}

	fn execute<'a>(
		&'a self,
		service: &'a LookoutService,
		_: &'a Message,
		args: &'a str,
	) -> BoxFuture<'a, String> {
		Box::pin(async move {
			let Some(server) = args.split_whitespace().next() else {
				return "No server argument found.".to_string();
			};
			let server = query::title_case(server);

			match service.server_listings(&server) {
				Some(listings) if listings.is_empty() => {
					format!("**{server}**\n\nNo groups are currently listed.")
				},
				Some(listings) => format!("**{server}**\n\n{listings}"),
				None => "A server with that name was not found.".to_string(),
			}
		})
	}
}

struct HelpCommand;
impl Command for HelpCommand {
	fn name(&self) -> &'static str {
		"help"
	}

	fn help(&self) -> &'static str {
		"*[prefix]help (command)*\n\n\
		 Lists the commands, or explains one of them.\n\
		 Ex: `lo!help groups`"
	}

	fn execute<'a>(
		&'a self,
		_: &'a LookoutService,
		_: &'a Message,
		args: &'a str,
	) -> BoxFuture<'a, String> {
		Box::pin(async move {
			match args.split_whitespace().next() {
				Some(name) => match find(name) {
					Some(command) => command.help().to_string(),
					None => format!("No command named {name} exists."),
				},
				None => {
					let names: Vec<_> = commands().iter().map(|command| command.name()).collect();

					format!(
						"**Commands**\n\n{}\n\n\
						 For more information on a command, use `lo!help [command]`.",
						names.join("\n")
					)
				},
			}
		})
	}
}

struct LookoutCommand;
impl Command for LookoutCommand {
	fn name(&self) -> &'static str {
		"lookout"
	}

	fn help(&self) -> &'static str {
		"*[prefix]lookout Server:[name] Duration:[0h1m-24h0m] (Level:[1-30]) \
		 (-/+)term (-/+)\"a phrase\"*\n\n\
		 Saves the query so that for the specified duration, the user is notified of any \
		 matching groups. Terms and phrases are searched against all of a group's text; a field \
		 name followed by a colon restricts a term to that field.\n\
		 Valid fields: *Comment, Difficulty, QuestName, Patron, AdventurePack, AdventureArea, \
		 QuestJournalGroup, GroupSize, Locations, MinimumLevel, MaximumLevel, AdventureActive, \
		 Members*\n\
		 Ex: `lo!lookout Server:Cannith Duration:5h Level:30 +Raid +\"Killing Time\"`"
	}

	fn execute<'a>(
		&'a self,
		service: &'a LookoutService,
		message: &'a Message,
		args: &'a str,
	) -> BoxFuture<'a, String> {
		Box::pin(async move {
			match service.save_query(&message.author_id, &message.channel_id, args).await {
				Ok(saved) => format!(
					"Lookout query {:X} saved for {}.",
					saved.id,
					duration::format(saved.ttl)
				),
				Err(Error::Query(err)) => format!("There was an error processing the query: {err}"),
				Err(Error::InvalidRequest { message: reason }) => {
					format!("There was an error processing the query: {reason}")
				},
				Err(Error::IndicesFull) => format!(
					"You already have {} active queries. Cancel one before adding another.",
					ids::MAX_SLOTS
				),
				Err(err) => {
					tracing::error!(
						error = %err,
						author_id = %message.author_id,
						"Failed to save query."
					);

					"Oh dear, it seems like there was a problem.".to_string()
				},
			}
		})
	}
}

struct ServersCommand;
impl Command for ServersCommand {
	fn name(&self) -> &'static str {
		"servers"
	}

	fn help(&self) -> &'static str {
		"*[prefix]servers*\n\nReturns the list of servers.\nEx: `lo!servers`"
	}

	fn execute<'a>(
		&'a self,
		service: &'a LookoutService,
		_: &'a Message,
		_: &'a str,
	) -> BoxFuture<'a, String> {
		Box::pin(async move { format!("**Servers**\n\n{}", service.servers().join("\n")) })
	}
}
