use mongodb::{Client, Database};
use testcontainers::runners::AsyncRunner;
use testcontainers::{ContainerAsync, ImageExt};
use testcontainers_modules::mongo::Mongo;

const IMAGE_TAG: &str = "7";

/// A `mongo:7` container plus a client connected to it
///
/// The container is removed when this value is dropped, so keep it alive for
/// the whole test. Give each test its own database (see
/// [`crate::TestDataBuilder::database_name`]).
pub struct TestMongo {
    _container: ContainerAsync<Mongo>,
    client: Client,
    uri: String,
}

impl TestMongo {
    /// Panics when Docker is unavailable; mark callers `#[ignore = "requires Docker"]`
    pub async fn new() -> Self {
        let container = Mongo::default()
            .with_tag(IMAGE_TAG)
            .start()
            .await
            .expect("start MongoDB container");
        let port = container
            .get_host_port_ipv4(27017)
            .await
            .expect("MongoDB container port");

        let uri = format!("mongodb://127.0.0.1:{port}");
        let client = Client::with_uri_str(&uri).await.expect("MongoDB client");
        tracing::debug!(%uri, "Test MongoDB started");

        Self {
            _container: container,
            client,
            uri,
        }
    }

    pub fn client(&self) -> Client {
        self.client.clone()
    }

    pub fn database(&self, name: &str) -> Database {
        self.client.database(name)
    }

    pub fn connection_string(&self) -> &str {
        &self.uri
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bson::doc;

    #[tokio::test]
    #[ignore = "requires Docker"]
    async fn test_insert_then_find() {
        let mongo = TestMongo::new().await;
        let things = mongo
            .database("test_utils")
            .collection::<bson::Document>("things");

        things.insert_one(doc! { "name": "lamp" }).await.unwrap();
        assert!(things.find_one(doc! { "name": "lamp" }).await.unwrap().is_some());
        assert!(mongo.connection_string().starts_with("mongodb://127.0.0.1:"));
    }
}
