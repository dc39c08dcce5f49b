use anyhow::{Context, Result};
use serde::Deserialize;
use serde_json::json;

use crate::driver::{GameServer, GridInfo, ServerReply, Status};
use crate::knowledge::{Observation, Species};

#[derive(Debug, Deserialize)]
struct MoveResponse {
    status: Status,
    #[serde(default)]
    msg: String,
    #[serde(default)]
    infos: Vec<Observation>,
}

#[derive(Debug, Deserialize)]
struct NewGridResponse {
    status: Status,
    #[serde(default)]
    msg: String,
    grid_infos: Option<GridInfo>,
}

/// Blocking JSON client for a remote Crocomine server. Every request carries
/// the group and member names; responses come back as `{status, msg, infos}`.
pub struct CrocomineClient {
    http: ureq::Agent,
    base: String,
    group: String,
    members: String,
}

impl CrocomineClient {
    pub fn new(server: &str, group: &str, members: &str) -> Self {
        CrocomineClient {
            http: ureq::agent(),
            base: server.trim_end_matches('/').to_string(),
            group: group.to_string(),
            members: members.to_string(),
        }
    }

    fn post<T: for<'de> Deserialize<'de>>(&self, path: &str, body: serde_json::Value) -> Result<T> {
        let url = format!("{}/{path}", self.base);
        let response = self
            .http
            .post(&url)
            .send_json(body)
            .with_context(|| format!("POST {url}"))?;
        response
            .into_json()
            .with_context(|| format!("malformed reply from {url}"))
    }

    fn send_move(&self, path: &str, mut body: serde_json::Value) -> Result<ServerReply> {
        body["group"] = json!(self.group);
        body["members"] = json!(self.members);
        let reply: MoveResponse = self.post(path, body)?;
        Ok((reply.status, reply.msg, reply.infos))
    }
}

impl GameServer for CrocomineClient {
    fn new_grid(&mut self) -> Result<(Status, String, Option<GridInfo>)> {
        let reply: NewGridResponse = self.post(
            "new_grid",
            json!({ "group": self.group, "members": self.members }),
        )?;
        Ok((reply.status, reply.msg, reply.grid_infos))
    }

    fn discover(&mut self, row: usize, col: usize) -> Result<ServerReply> {
        self.send_move("discover", json!({ "row": row, "col": col }))
    }

    fn guess(&mut self, row: usize, col: usize, species: Species) -> Result<ServerReply> {
        self.send_move(
            "guess",
            json!({ "row": row, "col": col, "animal": species.code() }),
        )
    }

    fn chord(&mut self, row: usize, col: usize) -> Result<ServerReply> {
        self.send_move("chord", json!({ "row": row, "col": col }))
    }
}
