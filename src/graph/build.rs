//! Builds

use super::records::{self, BuildOutput, BuildRecord};
use super::{BuildId, EvalId, Evaluation, Jobset, Project, Session};
use crate::error::{HydraError, HydraResult};
use std::collections::BTreeMap;
use std::sync::Arc;
use tokio::sync::OnceCell;
use tracing::debug;

/// Everything one `build/{id}` response yields
#[derive(Debug)]
struct BuildDetails {
    project: Project,
    jobset: Arc<Jobset>,
    latest_eval: EvalId,
    outputs: BTreeMap<String, BuildOutput>,
}

/// A build, fetched on first access to any derived property
#[derive(Debug)]
pub struct Build {
    id: BuildId,
    details: OnceCell<BuildDetails>,
}

impl Build {
    pub fn new(id: BuildId) -> Self {
        Self {
            id,
            details: OnceCell::new(),
        }
    }

    pub fn id(&self) -> BuildId {
        self.id
    }

    pub async fn project(&self, session: &Session) -> HydraResult<&Project> {
        Ok(&self.details(session).await?.project)
    }

    pub async fn jobset(&self, session: &Session) -> HydraResult<&Arc<Jobset>> {
        Ok(&self.details(session).await?.jobset)
    }

    /// Id of the newest evaluation this build belongs to
    pub async fn latest_evaluation_id(&self, session: &Session) -> HydraResult<EvalId> {
        Ok(self.details(session).await?.latest_eval)
    }

    /// The session's shared instance of the newest evaluation
    pub async fn latest_evaluation(&self, session: &Session) -> HydraResult<Arc<Evaluation>> {
        let id = self.latest_evaluation_id(session).await?;
        Ok(session.evaluation(id).await)
    }

    pub async fn outputs(&self, session: &Session) -> HydraResult<&BTreeMap<String, BuildOutput>> {
        Ok(&self.details(session).await?.outputs)
    }

    /// Store path of the named output
    pub async fn output_path(&self, session: &Session, output: &str) -> HydraResult<&str> {
        self.outputs(session)
            .await?
            .get(output)
            .map(|o| o.path.as_str())
            .ok_or_else(|| HydraError::missing(self.entity(), format!("buildoutputs.{output}")))
    }

    /// Populate the build record without reading anything from it
    pub(crate) async fn prefetch(&self, session: &Session) -> HydraResult<()> {
        self.details(session).await.map(|_| ())
    }

    fn entity(&self) -> String {
        format!("Build {}", self.id)
    }

    async fn details(&self, session: &Session) -> HydraResult<&BuildDetails> {
        self.details.get_or_try_init(|| self.fetch(session)).await
    }

    async fn fetch(&self, session: &Session) -> HydraResult<BuildDetails> {
        let entity = self.entity();
        let value = session
            .fetcher()
            .get(["build".to_string(), self.id.to_string()])
            .await?;
        let record: BuildRecord = records::decode(&entity, &value)?;

        let project = record
            .project
            .map(Project::new)
            .ok_or_else(|| HydraError::missing(&entity, "project"))?;
        let jobset_name = record
            .jobset
            .ok_or_else(|| HydraError::missing(&entity, "jobset"))?;
        let latest_eval = record
            .jobsetevals
            .and_then(|evals| evals.first().copied())
            .ok_or_else(|| HydraError::missing(&entity, "jobsetevals"))?;
        let outputs = record
            .buildoutputs
            .ok_or_else(|| HydraError::missing(&entity, "buildoutputs"))?;

        debug!(
            "Build {} belongs to {}:{}, latest evaluation {}",
            self.id, project, jobset_name, latest_eval
        );

        let jobset = session.jobset(&project, &jobset_name).await;
        Ok(BuildDetails {
            project,
            jobset,
            latest_eval,
            outputs,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::testing::FakeTransport;
    use crate::graph::testing::session_with;
    use serde_json::json;

    fn build_20() -> FakeTransport {
        FakeTransport::new().with_json(
            "build/20",
            json!({
                "project": "proj",
                "jobset": "lib",
                "jobsetevals": [8, 5],
                "buildoutputs": {
                    "out": { "path": "/nix/store/aaa-lib" },
                    "doc": { "path": "/nix/store/bbb-lib-doc" }
                }
            }),
        )
    }

    #[tokio::test]
    async fn one_fetch_populates_every_accessor() {
        let (session, fake) = session_with(build_20());
        let build = Build::new(BuildId(20));

        assert_eq!(build.project(&session).await.unwrap().name(), "proj");
        assert_eq!(build.jobset(&session).await.unwrap().name(), "lib");
        assert_eq!(build.latest_evaluation_id(&session).await.unwrap(), EvalId(8));
        assert_eq!(
            build.output_path(&session, "out").await.unwrap(),
            "/nix/store/aaa-lib"
        );
        assert_eq!(build.outputs(&session).await.unwrap().len(), 2);

        assert_eq!(fake.requests(), vec!["build/20"]);
    }

    #[tokio::test]
    async fn latest_evaluation_is_shared_through_session() {
        let (session, _fake) = session_with(build_20());
        let a = Build::new(BuildId(20));
        let b = Build::new(BuildId(20));

        let eval_a = a.latest_evaluation(&session).await.unwrap();
        let eval_b = b.latest_evaluation(&session).await.unwrap();
        assert!(Arc::ptr_eq(&eval_a, &eval_b));
    }

    #[tokio::test]
    async fn empty_evaluation_list_is_missing_data() {
        let fake = FakeTransport::new().with_json(
            "build/21",
            json!({
                "project": "proj",
                "jobset": "lib",
                "jobsetevals": [],
                "buildoutputs": {}
            }),
        );
        let (session, _fake) = session_with(fake);

        let err = Build::new(BuildId(21))
            .latest_evaluation_id(&session)
            .await
            .unwrap_err();
        match err {
            HydraError::MissingData { entity, field } => {
                assert_eq!(entity, "Build 21");
                assert_eq!(field, "jobsetevals");
            }
            other => panic!("expected MissingData, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn missing_output_names_the_output() {
        let (session, _fake) = session_with(build_20());
        let err = Build::new(BuildId(20))
            .output_path(&session, "bin")
            .await
            .unwrap_err();
        assert!(err.to_string().contains("buildoutputs.bin"));
    }
}
