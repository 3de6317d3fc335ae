pub mod files;
pub mod messages;
pub mod models;
pub mod users;

pub use files::FileRepository;
pub use messages::MessageRepository;
pub use models::{FileDoc, Message, User};
pub use users::UserRepository;

use bson::{doc, Document};
use mongodb::{Client, Collection};

use crate::error::AppError;

pub const USERS: &str = "users";
pub const MESSAGES: &str = "messages";
pub const FILES: &str = "files";

/// Shared handle to the document store
#[derive(Clone)]
pub struct Database {
    pub users: Collection<User>,
    /// Untyped view of `users`; documents are heterogeneous
    pub user_documents: Collection<Document>,
    pub messages: Collection<Message>,
    pub files: Collection<FileDoc>,
}

impl Database {
    /// Bind collection handles. No I/O happens until the first operation.
    pub fn new(client: &Client, db_name: &str) -> Self {
        let db = client.database(db_name);

        Database {
            users: db.collection(USERS),
            user_documents: db.collection(USERS),
            messages: db.collection(MESSAGES),
            files: db.collection(FILES),
        }
    }

    /// Connect and ping; the server must not start serving until this succeeds
    pub async fn connect(uri: &str, db_name: &str) -> Result<Self, AppError> {
        let client = Client::with_uri_str(uri).await?;

        client
            .database(db_name)
            .run_command(doc! { "ping": 1 })
            .await?;

        Ok(Self::new(&client, db_name))
    }
}
