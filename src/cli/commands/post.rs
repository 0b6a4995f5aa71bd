use clap::Subcommand;
use serde_json::Value;

use crate::cli::utils::{output_data, output_success, ApiClient};
use crate::cli::OutputFormat;

#[derive(Subcommand)]
pub enum PostCommands {
    #[command(about = "List published posts")]
    List,

    #[command(about = "Show one post")]
    Show {
        #[arg(help = "Post slug")]
        slug: String,
    },

    #[command(about = "Create a post (admin)")]
    Create {
        #[arg(long)]
        slug: String,
        #[arg(long)]
        title: String,
        #[arg(long, help = "Markdown body")]
        markdown: String,
    },

    #[command(about = "Update a post (admin); omitted fields keep their value")]
    Update {
        #[arg(help = "Current post slug")]
        slug: String,
        #[arg(long, help = "New slug")]
        new_slug: Option<String>,
        #[arg(long)]
        title: Option<String>,
        #[arg(long, help = "Markdown body")]
        markdown: Option<String>,
    },

    #[command(about = "Delete a post (admin)")]
    Delete {
        #[arg(help = "Post slug")]
        slug: String,
    },
}

pub async fn handle(cmd: PostCommands, url: Option<String>, output_format: OutputFormat) -> anyhow::Result<()> {
    let (client, _) = ApiClient::from_session(url)?;

    match cmd {
        PostCommands::List => {
            let index = client.get("/posts").await?;
            output_data(output_format, &index, |data| {
                let posts = data["posts"].as_array().cloned().unwrap_or_default();
                if posts.is_empty() {
                    println!("No posts yet");
                }
                for post in posts {
                    println!("{:<24} {}", text(&post["slug"]), text(&post["title"]));
                }
            })
        }
        PostCommands::Show { slug } => {
            let post = client.get(&format!("/posts/{}", slug)).await?;
            output_data(output_format, &post, |data| {
                println!("# {}\n", text(&data["title"]));
                println!("{}", text(&data["markdown"]));
            })
        }
        PostCommands::Create { slug, title, markdown } => {
            let form = [
                ("intent", "create"),
                ("slug", slug.as_str()),
                ("title", title.as_str()),
                ("markdown", markdown.as_str()),
            ];
            client.post_form("/posts/admin/new", &form).await?;
            output_success(output_format, &format!("Created post '{}'", slug), None)
        }
        PostCommands::Update { slug, new_slug, title, markdown } => {
            let current = client.get(&format!("/posts/admin/{}", slug)).await?;
            let post = &current["post"];
            let new_slug = new_slug.unwrap_or_else(|| text(&post["slug"]));
            let title = title.unwrap_or_else(|| text(&post["title"]));
            let markdown = markdown.unwrap_or_else(|| text(&post["markdown"]));

            let form = [
                ("intent", "update"),
                ("slug", new_slug.as_str()),
                ("title", title.as_str()),
                ("markdown", markdown.as_str()),
            ];
            client.post_form(&format!("/posts/admin/{}", slug), &form).await?;
            output_success(output_format, &format!("Updated post '{}'", new_slug), None)
        }
        PostCommands::Delete { slug } => {
            client
                .post_form(&format!("/posts/admin/{}", slug), &[("intent", "delete")])
                .await?;
            output_success(output_format, &format!("Deleted post '{}'", slug), None)
        }
    }
}

fn text(value: &Value) -> String {
    value.as_str().unwrap_or_default().to_string()
}
