//! Projects and jobsets

use super::records::{self, JobsetRecord};
use super::Session;
use crate::error::{HydraError, HydraResult};
use std::collections::BTreeMap;
use std::fmt;
use tokio::sync::OnceCell;
use tracing::debug;

/// A Hydra project, known only by name
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Project {
    name: String,
}

impl Project {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }

    pub fn name(&self) -> &str {
        &self.name
    }
}

impl fmt::Display for Project {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)
    }
}

/// A jobset and its declared (unresolved) input references
#[derive(Debug)]
pub struct Jobset {
    project: Project,
    name: String,
    inputs: OnceCell<BTreeMap<String, Vec<String>>>,
}

impl Jobset {
    pub fn new(project: Project, name: impl Into<String>) -> Self {
        Self {
            project,
            name: name.into(),
            inputs: OnceCell::new(),
        }
    }

    pub fn project(&self) -> &Project {
        &self.project
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Input name to its raw alternatives, fetched on first use
    pub async fn inputs(&self, session: &Session) -> HydraResult<&BTreeMap<String, Vec<String>>> {
        self.inputs.get_or_try_init(|| self.fetch(session)).await
    }

    /// The single `project:jobset:input` reference declared for `input`.
    ///
    /// Repeated identical alternatives count as one; several distinct ones
    /// are rejected.
    pub async fn input_ref(&self, session: &Session, input: &str) -> HydraResult<&str> {
        let field = format!("jobsetinputs.{input}");
        let alts = self
            .inputs(session)
            .await?
            .get(input)
            .ok_or_else(|| HydraError::missing(self.entity(), &field))?;

        let mut distinct: Vec<&str> = Vec::with_capacity(alts.len());
        for alt in alts {
            if !distinct.contains(&alt.as_str()) {
                distinct.push(alt);
            }
        }

        match distinct.as_slice() {
            [] => Err(HydraError::missing(
                self.entity(),
                format!("{field}.jobsetinputalts"),
            )),
            [only] => Ok(*only),
            _ => Err(HydraError::UnsupportedInputAlt {
                jobset: self.to_string(),
                input: input.to_string(),
                alts: distinct.iter().map(|s| s.to_string()).collect(),
            }),
        }
    }

    fn entity(&self) -> String {
        format!("Jobset {self}")
    }

    async fn fetch(&self, session: &Session) -> HydraResult<BTreeMap<String, Vec<String>>> {
        let value = session
            .fetcher()
            .get(["jobset", self.project.name(), self.name.as_str()])
            .await?;
        let record: JobsetRecord = records::decode(&self.entity(), &value)?;
        let inputs = record
            .jobsetinputs
            .ok_or_else(|| HydraError::missing(self.entity(), "jobsetinputs"))?;

        debug!("Jobset {} declares {} inputs", self, inputs.len());
        Ok(inputs
            .into_iter()
            .map(|(name, input)| (name, input.jobsetinputalts.unwrap_or_default()))
            .collect())
    }
}

impl fmt::Display for Jobset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.project, self.name)
    }
}
