//! Evaluations
//!
//! The API does not report which project or jobset an evaluation belongs
//! to, so both are borrowed from the evaluation's first build.

use super::records::{self, EvalRecord};
use super::{Build, BuildId, EvalId, Jobset, Project, Session};
use crate::error::{HydraError, HydraResult};
use crate::resolve::{InputValue, RawInput};
use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;
use tokio::sync::{Mutex, OnceCell};
use tracing::debug;

/// Everything one `eval/{id}` response yields
#[derive(Debug)]
pub(crate) struct EvalContents {
    pub builds: Vec<Arc<Build>>,
    pub inputs: BTreeMap<String, RawInput>,
}

/// A jobset evaluation
#[derive(Debug)]
pub struct Evaluation {
    id: EvalId,
    contents: OnceCell<EvalContents>,
    /// Builds referenced by build-typed inputs, shared between inputs
    input_builds: Mutex<HashMap<BuildId, Arc<Build>>>,
    pub(crate) resolved: OnceCell<BTreeMap<String, InputValue>>,
}

impl Evaluation {
    pub fn new(id: EvalId) -> Self {
        Self {
            id,
            contents: OnceCell::new(),
            input_builds: Mutex::new(HashMap::new()),
            resolved: OnceCell::new(),
        }
    }

    pub fn id(&self) -> EvalId {
        self.id
    }

    /// Ids of the builds produced by this evaluation
    pub async fn build_ids(&self, session: &Session) -> HydraResult<Vec<BuildId>> {
        let contents = self.contents(session).await?;
        Ok(contents.builds.iter().map(|b| b.id()).collect())
    }

    /// Raw, unresolved input descriptors
    pub async fn raw_inputs(&self, session: &Session) -> HydraResult<&BTreeMap<String, RawInput>> {
        Ok(&self.contents(session).await?.inputs)
    }

    pub async fn project(&self, session: &Session) -> HydraResult<&Project> {
        self.first_build(session).await?.project(session).await
    }

    pub async fn jobset(&self, session: &Session) -> HydraResult<&Arc<Jobset>> {
        self.first_build(session).await?.jobset(session).await
    }

    /// The build object for a dependency of this evaluation's inputs
    pub(crate) async fn input_build(&self, id: BuildId) -> Arc<Build> {
        let mut builds = self.input_builds.lock().await;
        builds
            .entry(id)
            .or_insert_with(|| Arc::new(Build::new(id)))
            .clone()
    }

    pub(crate) async fn contents(&self, session: &Session) -> HydraResult<&EvalContents> {
        self.contents.get_or_try_init(|| self.fetch(session)).await
    }

    async fn first_build(&self, session: &Session) -> HydraResult<&Arc<Build>> {
        self.contents(session)
            .await?
            .builds
            .first()
            .ok_or(HydraError::NoBuilds(self.id))
    }

    async fn fetch(&self, session: &Session) -> HydraResult<EvalContents> {
        let entity = format!("Evaluation {}", self.id);
        let value = session
            .fetcher()
            .get(["eval".to_string(), self.id.to_string()])
            .await?;
        let record: EvalRecord = records::decode(&entity, &value)?;

        let inputs = record
            .jobsetevalinputs
            .ok_or_else(|| HydraError::missing(&entity, "jobsetevalinputs"))?;
        if inputs.is_empty() {
            return Err(HydraError::NoInputs(self.id));
        }
        let builds = record
            .builds
            .ok_or_else(|| HydraError::missing(&entity, "builds"))?;
        if builds.is_empty() {
            return Err(HydraError::NoBuilds(self.id));
        }

        debug!(
            "Evaluation {} has {} builds and {} inputs",
            self.id,
            builds.len(),
            inputs.len()
        );
        Ok(EvalContents {
            builds: builds.into_iter().map(|id| Arc::new(Build::new(id))).collect(),
            inputs,
        })
    }
}
