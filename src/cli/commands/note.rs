use clap::Subcommand;
use serde_json::json;

use crate::cli::utils::{output_data, output_success, ApiClient};
use crate::cli::OutputFormat;

#[derive(Subcommand)]
pub enum NoteCommands {
    #[command(about = "List your notes, most recently updated first")]
    List,

    #[command(about = "Show one note")]
    Show {
        #[arg(help = "Note id")]
        id: String,
    },

    #[command(about = "Create a note")]
    Create {
        #[arg(long)]
        title: String,
        #[arg(long)]
        body: String,
    },

    #[command(about = "Delete a note")]
    Delete {
        #[arg(help = "Note id")]
        id: String,
    },
}

pub async fn handle(cmd: NoteCommands, url: Option<String>, output_format: OutputFormat) -> anyhow::Result<()> {
    let (client, _) = ApiClient::from_session(url)?;

    match cmd {
        NoteCommands::List => {
            let index = client.get("/notes").await?;
            output_data(output_format, &index, |data| {
                let notes = data["notes"].as_array().cloned().unwrap_or_default();
                if notes.is_empty() {
                    println!("No notes yet");
                }
                for note in notes {
                    println!(
                        "{}  {}",
                        note["id"].as_str().unwrap_or_default(),
                        note["title"].as_str().unwrap_or_default()
                    );
                }
            })
        }
        NoteCommands::Show { id } => {
            let note = client.get(&format!("/notes/{}", id)).await?;
            output_data(output_format, &note, |data| {
                println!("{}\n", data["title"].as_str().unwrap_or_default());
                println!("{}", data["body"].as_str().unwrap_or_default());
            })
        }
        NoteCommands::Create { title, body } => {
            let note = client
                .post_json("/notes", &json!({ "title": title, "body": body }))
                .await?;
            output_success(
                output_format,
                &format!("Created note {}", note["id"].as_str().unwrap_or_default()),
                Some(note),
            )
        }
        NoteCommands::Delete { id } => {
            client.delete(&format!("/notes/{}", id)).await?;
            output_success(output_format, &format!("Deleted note {}", id), None)
        }
    }
}
