//! Input resolution
//!
//! Turns an evaluation's raw input descriptors into effective values.
//! Leaf inputs (string, boolean, path, git) convert directly. A
//! build-typed input names another build; its value is looked up in the
//! resolved inputs of that build's latest evaluation, in priority order:
//!
//! 1. `<output>-src`, the source input a generated dependency publishes
//! 2. `<output>`, the input named like the referenced output
//! 3. the dependency's `out` store path
//!
//! where `<output>` is the last segment of the jobset's
//! `project:jobset:input` reference for that input.

mod value;

pub use value::{InputKind, InputValue, RawInput};
pub(crate) use value::InputSite;

use crate::error::{HydraError, HydraResult};
use crate::graph::{Build, BuildId, EvalContents, EvalId, Evaluation, Session};
use futures_util::future::{try_join_all, BoxFuture};
use futures_util::FutureExt;
use serde::Serialize;
use std::collections::BTreeMap;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Suffix under which a dependency publishes its own source input
const SOURCE_SUFFIX: &str = "-src";

/// Output whose store path is the last-resort value of a build input
const PRIMARY_OUTPUT: &str = "out";

/// Fully resolved inputs of one evaluation
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Resolution {
    pub evaluation: EvalId,
    pub inputs: BTreeMap<String, InputValue>,
}

impl Session {
    /// Resolve every input of evaluation `id`
    pub async fn resolve(&self, id: EvalId) -> HydraResult<Resolution> {
        info!("Resolving inputs of evaluation {}", id);
        let evaluation = self.evaluation(id).await;
        let inputs = evaluation.inputs(self).await?.clone();
        info!(
            "Evaluation {} resolved with {} requests",
            id,
            self.fetcher().request_count()
        );
        Ok(Resolution {
            evaluation: id,
            inputs,
        })
    }
}

impl Evaluation {
    /// Input name to effective value, computed once per instance
    pub async fn inputs<'a>(
        &'a self,
        session: &'a Session,
    ) -> HydraResult<&'a BTreeMap<String, InputValue>> {
        self.inputs_on_path(session, &[]).await
    }

    /// `path` holds the evaluations currently being resolved above this one
    fn inputs_on_path<'a>(
        &'a self,
        session: &'a Session,
        path: &'a [EvalId],
    ) -> BoxFuture<'a, HydraResult<&'a BTreeMap<String, InputValue>>> {
        async move {
            if let Some(resolved) = self.resolved.get() {
                return Ok(resolved);
            }

            if let Some(start) = path.iter().position(|id| *id == self.id()) {
                let mut cycle = path[start..].to_vec();
                cycle.push(self.id());
                return Err(HydraError::DependencyCycle {
                    eval: self.id(),
                    path: cycle,
                });
            }

            let limit = session.options().max_depth;
            if path.len() >= limit {
                return Err(HydraError::RecursionLimit {
                    eval: self.id(),
                    limit,
                });
            }

            let mut active = path.to_vec();
            active.push(self.id());
            self.resolved
                .get_or_try_init(|| self.resolve_all(session, &active))
                .await
        }
        .boxed()
    }

    async fn resolve_all(
        &self,
        session: &Session,
        path: &[EvalId],
    ) -> HydraResult<BTreeMap<String, InputValue>> {
        let contents = self.contents(session).await?;
        if session.options().prefetch {
            self.prefetch_dependencies(session, contents).await?;
        }

        let mut resolved = BTreeMap::new();
        for (name, raw) in &contents.inputs {
            let value = self.resolve_input(session, path, name, raw).await?;
            resolved.insert(name.clone(), value);
        }

        debug!("Resolved {} inputs of evaluation {}", resolved.len(), self.id());
        Ok(resolved)
    }

    /// Fetch the records of all directly referenced builds at once.
    /// Descriptors that fail to parse are left for the ordered pass to report.
    async fn prefetch_dependencies(
        &self,
        session: &Session,
        contents: &EvalContents,
    ) -> HydraResult<()> {
        let mut pending: Vec<(&str, Arc<Build>)> = Vec::new();
        for (name, raw) in &contents.inputs {
            let site = InputSite {
                eval: self.id(),
                name,
            };
            if let (Ok(InputKind::Build), Ok(build_id)) = (raw.kind(&site), raw.dependency(&site)) {
                pending.push((name.as_str(), self.input_build(build_id).await));
            }
        }

        if pending.is_empty() {
            return Ok(());
        }

        debug!(
            "Prefetching {} dependency builds of evaluation {}",
            pending.len(),
            self.id()
        );
        try_join_all(pending.iter().map(|(name, build)| async move {
            build
                .prefetch(session)
                .await
                .map_err(|e| self.input_error(name, build.id(), e))
        }))
        .await?;
        Ok(())
    }

    async fn resolve_input(
        &self,
        session: &Session,
        path: &[EvalId],
        name: &str,
        raw: &RawInput,
    ) -> HydraResult<InputValue> {
        let site = InputSite {
            eval: self.id(),
            name,
        };

        let kind = match raw.kind(&site) {
            Ok(kind) => kind,
            Err(e) => {
                warn!("Cannot parse input '{}' of evaluation {}: {:?}", name, self.id(), raw);
                return Err(e);
            }
        };

        match kind {
            InputKind::Build => {
                let build_id = raw.dependency(&site)?;
                self.resolve_build_input(session, path, name, build_id)
                    .await
                    .map_err(|e| self.input_error(name, build_id, e))
            }
            leaf => raw.to_leaf_value(leaf, &site),
        }
    }

    async fn resolve_build_input(
        &self,
        session: &Session,
        path: &[EvalId],
        name: &str,
        build_id: BuildId,
    ) -> HydraResult<InputValue> {
        let build = self.input_build(build_id).await;

        let reference = self.jobset(session).await?.input_ref(session, name).await?;
        let dep_output = reference
            .rsplit_once(':')
            .map_or(reference, |(_, last)| last)
            .to_string();
        let preferred = format!("{dep_output}{SOURCE_SUFFIX}");

        let dep_eval = build.latest_evaluation(session).await?;
        let dep_inputs = dep_eval.inputs_on_path(session, path).await?;

        if let Some(value) = dep_inputs.get(&preferred) {
            debug!(
                "Input '{}' <- '{}' of evaluation {}",
                name,
                preferred,
                dep_eval.id()
            );
            return Ok(value.clone());
        }

        if let Some(value) = dep_inputs.get(&dep_output) {
            debug!(
                "Input '{}' <- '{}' of evaluation {}",
                name,
                dep_output,
                dep_eval.id()
            );
            return Ok(value.clone());
        }

        let out = build.output_path(session, PRIMARY_OUTPUT).await?;
        debug!("Input '{}' <- output of build {}", name, build_id);
        Ok(InputValue::Path {
            value: out.to_string(),
        })
    }

    fn input_error(&self, input: &str, build: BuildId, source: HydraError) -> HydraError {
        HydraError::Input {
            eval: self.id(),
            input: input.to_string(),
            build,
            source: Box::new(source),
        }
    }
}
