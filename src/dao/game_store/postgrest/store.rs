use std::sync::Arc;

use futures::future::BoxFuture;
use reqwest::{Client, Method};
use serde::de::DeserializeOwned;
use uuid::Uuid;

use crate::dao::{
    game_store::GameStore,
    models::{GameEntity, GameRecordPatch, GameSnapshot, NewGameRecord, ParticipantUpsert},
    storage::StorageResult,
};

use super::{
    config::RestConfig,
    error::{RestDaoError, RestResult},
    models::{
        GAME_SELECT, GAMES_TABLE, GamePatchBody, GameRow, NewGameRow, NotePatchBody,
        PARTICIPANTS_TABLE, ParticipantUpsertRow,
    },
};

/// [`GameStore`] backed by a PostgREST endpoint.
///
/// All row-level authorization lives server-side; a refused write surfaces as
/// [`crate::dao::storage::StorageError::Rejected`] and is for callers to
/// classify.
#[derive(Clone)]
pub struct RestGameStore {
    client: Client,
    base_url: Arc<str>,
    api_key: Arc<str>,
}

impl RestGameStore {
    /// Build a client for the endpoint and probe it once.
    pub async fn connect(config: RestConfig) -> RestResult<Self> {
        let client = Client::builder()
            .build()
            .map_err(|source| RestDaoError::ClientBuilder { source })?;

        let store = Self {
            client,
            base_url: Arc::<str>::from(config.base_url.trim_end_matches('/')),
            api_key: Arc::<str>::from(config.api_key),
        };

        store.probe().await?;
        Ok(store)
    }

    fn request(&self, method: Method, table: &str) -> reqwest::RequestBuilder {
        let url = format!("{}/{}", self.base_url, table);
        self.client
            .request(method, url)
            .bearer_auth(self.api_key.as_ref())
            .header("apikey", self.api_key.as_ref())
    }

    async fn probe(&self) -> RestResult<()> {
        let response = self
            .request(Method::GET, GAMES_TABLE)
            .query(&[("select", "id"), ("limit", "1")])
            .send()
            .await
            .map_err(|source| RestDaoError::RequestSend {
                path: GAMES_TABLE.to_string(),
                source,
            })?;

        if response.status().is_success() {
            Ok(())
        } else {
            Err(RestDaoError::RequestStatus {
                path: GAMES_TABLE.to_string(),
                status: response.status(),
            })
        }
    }

    async fn get_rows<T>(&self, table: &str, query: &[(&str, &str)]) -> RestResult<Vec<T>>
    where
        T: DeserializeOwned,
    {
        let response = self
            .request(Method::GET, table)
            .query(query)
            .send()
            .await
            .map_err(|source| RestDaoError::RequestSend {
                path: table.to_string(),
                source,
            })?;

        match response.status() {
            status if status.is_success() => {
                response
                    .json::<Vec<T>>()
                    .await
                    .map_err(|source| RestDaoError::DecodeResponse {
                        path: table.to_string(),
                        source,
                    })
            }
            other => Err(RestDaoError::RequestStatus {
                path: table.to_string(),
                status: other,
            }),
        }
    }

    async fn expect_success(
        &self,
        builder: reqwest::RequestBuilder,
        table: &str,
    ) -> RestResult<()> {
        let response = builder
            .send()
            .await
            .map_err(|source| RestDaoError::RequestSend {
                path: table.to_string(),
                source,
            })?;

        if response.status().is_success() {
            Ok(())
        } else {
            Err(RestDaoError::RequestStatus {
                path: table.to_string(),
                status: response.status(),
            })
        }
    }
}

impl GameStore for RestGameStore {
    fn fetch_game(&self, id: Uuid) -> BoxFuture<'static, StorageResult<Option<GameSnapshot>>> {
        let store = self.clone();
        Box::pin(async move {
            let filter = format!("eq.{id}");
            let rows: Vec<GameRow> = store
                .get_rows(
                    GAMES_TABLE,
                    &[("select", GAME_SELECT), ("id", filter.as_str())],
                )
                .await?;
            Ok(rows.into_iter().next().map(GameRow::into_snapshot))
        })
    }

    fn list_games(&self) -> BoxFuture<'static, StorageResult<Vec<GameSnapshot>>> {
        let store = self.clone();
        Box::pin(async move {
            let rows: Vec<GameRow> = store
                .get_rows(
                    GAMES_TABLE,
                    &[("select", GAME_SELECT), ("order", "date.asc")],
                )
                .await?;
            Ok(rows.into_iter().map(GameRow::into_snapshot).collect())
        })
    }

    fn create_game(&self, record: NewGameRecord) -> BoxFuture<'static, StorageResult<GameEntity>> {
        let store = self.clone();
        Box::pin(async move {
            let body = NewGameRow::from(record);
            let response = store
                .request(Method::POST, GAMES_TABLE)
                .header("Prefer", "return=representation")
                .json(&body)
                .send()
                .await
                .map_err(|source| RestDaoError::RequestSend {
                    path: GAMES_TABLE.to_string(),
                    source,
                })?;

            if !response.status().is_success() {
                return Err(RestDaoError::RequestStatus {
                    path: GAMES_TABLE.to_string(),
                    status: response.status(),
                }
                .into());
            }

            let rows: Vec<GameRow> =
                response
                    .json()
                    .await
                    .map_err(|source| RestDaoError::DecodeResponse {
                        path: GAMES_TABLE.to_string(),
                        source,
                    })?;

            let row = rows.into_iter().next().ok_or(RestDaoError::MissingRow {
                path: GAMES_TABLE.to_string(),
            })?;

            Ok(row.into_snapshot().game)
        })
    }

    fn update_game(
        &self,
        id: Uuid,
        patch: GameRecordPatch,
    ) -> BoxFuture<'static, StorageResult<()>> {
        let store = self.clone();
        Box::pin(async move {
            let filter = format!("eq.{id}");
            let body = GamePatchBody::from(patch);
            let builder = store
                .request(Method::PATCH, GAMES_TABLE)
                .query(&[("id", filter.as_str())])
                .json(&body);
            store
                .expect_success(builder, GAMES_TABLE)
                .await
                .map_err(Into::into)
        })
    }

    fn delete_game(&self, id: Uuid) -> BoxFuture<'static, StorageResult<()>> {
        let store = self.clone();
        Box::pin(async move {
            let filter = format!("eq.{id}");
            let builder = store
                .request(Method::DELETE, GAMES_TABLE)
                .query(&[("id", filter.as_str())]);
            store
                .expect_success(builder, GAMES_TABLE)
                .await
                .map_err(Into::into)
        })
    }

    fn upsert_participant(
        &self,
        game_id: Uuid,
        participant: ParticipantUpsert,
    ) -> BoxFuture<'static, StorageResult<()>> {
        let store = self.clone();
        Box::pin(async move {
            let body = ParticipantUpsertRow {
                game_id,
                user_id: participant.user_id,
                voted_time: participant.voted_time,
            };
            let builder = store
                .request(Method::POST, PARTICIPANTS_TABLE)
                .header("Prefer", "resolution=merge-duplicates")
                .json(&body);
            store
                .expect_success(builder, PARTICIPANTS_TABLE)
                .await
                .map_err(Into::into)
        })
    }

    fn update_participant_note(
        &self,
        game_id: Uuid,
        user_id: Uuid,
        note: Option<String>,
    ) -> BoxFuture<'static, StorageResult<()>> {
        let store = self.clone();
        Box::pin(async move {
            let game_filter = format!("eq.{game_id}");
            let user_filter = format!("eq.{user_id}");
            let builder = store
                .request(Method::PATCH, PARTICIPANTS_TABLE)
                .query(&[
                    ("game_id", game_filter.as_str()),
                    ("user_id", user_filter.as_str()),
                ])
                .json(&NotePatchBody { note });
            store
                .expect_success(builder, PARTICIPANTS_TABLE)
                .await
                .map_err(Into::into)
        })
    }

    fn delete_participant(
        &self,
        game_id: Uuid,
        user_id: Uuid,
    ) -> BoxFuture<'static, StorageResult<()>> {
        let store = self.clone();
        Box::pin(async move {
            let game_filter = format!("eq.{game_id}");
            let user_filter = format!("eq.{user_id}");
            let builder = store.request(Method::DELETE, PARTICIPANTS_TABLE).query(&[
                ("game_id", game_filter.as_str()),
                ("user_id", user_filter.as_str()),
            ]);
            store
                .expect_success(builder, PARTICIPANTS_TABLE)
                .await
                .map_err(Into::into)
        })
    }

    fn clear_participants(&self, game_id: Uuid) -> BoxFuture<'static, StorageResult<()>> {
        let store = self.clone();
        Box::pin(async move {
            let game_filter = format!("eq.{game_id}");
            let builder = store
                .request(Method::DELETE, PARTICIPANTS_TABLE)
                .query(&[("game_id", game_filter.as_str())]);
            store
                .expect_success(builder, PARTICIPANTS_TABLE)
                .await
                .map_err(Into::into)
        })
    }

    fn health_check(&self) -> BoxFuture<'static, StorageResult<()>> {
        let store = self.clone();
        Box::pin(async move { store.probe().await.map_err(Into::into) })
    }
}
