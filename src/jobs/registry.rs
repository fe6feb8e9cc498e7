//! Registro de jobs: status, última execução e disparo assíncrono
//!
//! Um único mutex guarda a tabela de status inteira. O par
//! `status + last_run` é sempre lido e escrito sob esse lock, e o
//! check-then-set do disparo acontece numa única seção crítica: dois
//! disparos simultâneos do mesmo job nunca passam os dois.
//!
//! Cada execução roda numa task própria. O `JoinHandle` fica guardado até
//! alguém aguardar (`wait`/`drain`), o que permite esperar as execuções em
//! andamento no shutdown.

use chrono::Utc;
use std::collections::{BTreeMap, HashMap};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::{Duration, Instant};
use tokio::task::JoinHandle;
use uuid::Uuid;

use super::JobPipeline;
use crate::models::{JobState, JobStatus};
use crate::utils::logging::*;
use crate::utils::{SyncError, TriggerError};

pub struct JobRegistry {
    pipelines: HashMap<String, Arc<dyn JobPipeline>>,
    /// Ordem de registro, usada pelo painel
    names: Vec<String>,
    states: Mutex<HashMap<String, JobState>>,
    handles: Mutex<HashMap<String, JoinHandle<()>>>,
    job_timeout: Duration,
}

impl JobRegistry {
    pub fn new(job_timeout: Duration) -> Self {
        Self {
            pipelines: HashMap::new(),
            names: Vec::new(),
            states: Mutex::new(HashMap::new()),
            handles: Mutex::new(HashMap::new()),
            job_timeout,
        }
    }

    /// Registra um job com status `idle` e sem última execução
    ///
    /// Registrar de novo um nome existente troca o pipeline e zera o estado.
    pub fn register(&mut self, name: impl Into<String>, pipeline: Arc<dyn JobPipeline>) {
        let name = name.into();
        if !self.pipelines.contains_key(&name) {
            self.names.push(name.clone());
        }
        self.pipelines.insert(name.clone(), pipeline);
        lock(&self.states).insert(name, JobState::default());
    }

    pub fn names(&self) -> &[String] {
        &self.names
    }

    pub fn contains(&self, name: &str) -> bool {
        self.pipelines.contains_key(name)
    }

    /// Dispara o job sem esperar o fim da execução
    ///
    /// - `UnknownJob` se o nome não foi registrado (nada muda)
    /// - `AlreadyRunning` se o job está `iniciando` ou `executando`
    /// - Caso contrário marca `iniciando` e agenda a execução
    pub fn trigger(self: &Arc<Self>, name: &str) -> Result<(), TriggerError> {
        let pipeline = self
            .pipelines
            .get(name)
            .cloned()
            .ok_or_else(|| TriggerError::UnknownJob(name.to_string()))?;

        let mut states = lock(&self.states);
        let state = states
            .get_mut(name)
            .ok_or_else(|| TriggerError::UnknownJob(name.to_string()))?;

        if state.status.is_active() {
            return Err(TriggerError::AlreadyRunning(name.to_string()));
        }
        state.status = JobStatus::Iniciando;

        let registry = Arc::clone(self);
        let job = name.to_string();
        let handle = tokio::spawn(async move {
            registry.run(job, pipeline).await;
        });

        // Ainda sob `states`: o status final só é escrito depois do insert
        lock(&self.handles).insert(name.to_string(), handle);
        drop(states);

        log_job_triggered(name);
        Ok(())
    }

    /// Cópia independente de todos os estados, lida de uma só vez
    pub fn snapshot(&self) -> BTreeMap<String, JobState> {
        lock(&self.states)
            .iter()
            .map(|(name, state)| (name.clone(), state.clone()))
            .collect()
    }

    pub fn state(&self, name: &str) -> Option<JobState> {
        lock(&self.states).get(name).cloned()
    }

    /// Aguarda a execução mais recente do job, se houver uma pendente
    pub async fn wait(&self, name: &str) {
        let handle = lock(&self.handles).remove(name);
        if let Some(handle) = handle {
            if let Err(e) = handle.await {
                log_error(&format!("Task do job {} terminou de forma anormal: {}", name, e));
            }
        }
    }

    /// Aguarda todas as execuções pendentes
    pub async fn drain(&self) {
        let handles: Vec<(String, JoinHandle<()>)> = lock(&self.handles).drain().collect();
        for (name, handle) in handles {
            if let Err(e) = handle.await {
                log_error(&format!("Task do job {} terminou de forma anormal: {}", name, e));
            }
        }
    }

    async fn run(&self, name: String, pipeline: Arc<dyn JobPipeline>) {
        let run_id = Uuid::new_v4();
        self.set_status(&name, JobStatus::Executando);
        log_job_started(&name, &run_id);

        let started = Instant::now();
        let outcome = self.execute(pipeline, run_id).await;

        let status = match &outcome {
            Ok(report) => {
                log_job_succeeded(&name, &run_id, started.elapsed().as_millis() as u64);
                tracing::info!("📊 Job {} relatório: {:?}", name, report);
                JobStatus::Sucesso
            }
            Err(e) => {
                log_job_failed(&name, &run_id, &e.to_string());
                JobStatus::Erro
            }
        };

        self.finish(&name, status);
    }

    /// Roda o pipeline numa task separada para que panic e timeout virem `erro`
    async fn execute(
        &self,
        pipeline: Arc<dyn JobPipeline>,
        run_id: Uuid,
    ) -> Result<crate::models::SyncReport, SyncError> {
        let task = tokio::spawn(async move { pipeline.run(run_id).await });
        let abort = task.abort_handle();

        match tokio::time::timeout(self.job_timeout, task).await {
            Ok(Ok(result)) => result,
            Ok(Err(join_error)) => Err(SyncError::Panicked(join_error.to_string())),
            Err(_) => {
                abort.abort();
                Err(SyncError::Timeout(self.job_timeout.as_secs()))
            }
        }
    }

    fn set_status(&self, name: &str, status: JobStatus) {
        if let Some(state) = lock(&self.states).get_mut(name) {
            state.status = status;
        }
    }

    /// Status final e `last_run` na mesma seção crítica
    fn finish(&self, name: &str, status: JobStatus) {
        if let Some(state) = lock(&self.states).get_mut(name) {
            state.status = status;
            state.last_run = Some(Utc::now());
        }
    }
}

/// Lock tolerante a poison: um panic com o lock seguro não pode travar o painel
fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::JobDefinition;
    use crate::models::SyncReport;
    use crate::services::pipeline::stubs::{record, StubSheet, StubSource};
    use crate::services::pipeline::SyncPipeline;
    use crate::services::store::memory::MemoryTaskStore;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use tokio::sync::Notify;

    /// Conta execuções e, opcionalmente, espera liberação
    struct CountingPipeline {
        runs: AtomicUsize,
        gate: Option<Arc<Notify>>,
        fail: bool,
    }

    impl CountingPipeline {
        fn new() -> Self {
            Self {
                runs: AtomicUsize::new(0),
                gate: None,
                fail: false,
            }
        }

        fn gated(gate: Arc<Notify>) -> Self {
            Self {
                gate: Some(gate),
                ..Self::new()
            }
        }

        fn failing() -> Self {
            Self {
                fail: true,
                ..Self::new()
            }
        }
    }

    #[async_trait]
    impl JobPipeline for CountingPipeline {
        async fn run(&self, _run_id: Uuid) -> Result<SyncReport, SyncError> {
            self.runs.fetch_add(1, Ordering::SeqCst);
            if let Some(gate) = &self.gate {
                gate.notified().await;
            }
            if self.fail {
                Err(SyncError::DestinationUnavailable("boom".into()))
            } else {
                Ok(SyncReport::default())
            }
        }
    }

    struct SlowPipeline;

    #[async_trait]
    impl JobPipeline for SlowPipeline {
        async fn run(&self, _run_id: Uuid) -> Result<SyncReport, SyncError> {
            tokio::time::sleep(Duration::from_secs(30)).await;
            Ok(SyncReport::default())
        }
    }

    struct PanickingPipeline;

    #[async_trait]
    impl JobPipeline for PanickingPipeline {
        async fn run(&self, _run_id: Uuid) -> Result<SyncReport, SyncError> {
            panic!("índice fora do intervalo");
        }
    }

    fn registry_with(name: &str, pipeline: Arc<dyn JobPipeline>) -> Arc<JobRegistry> {
        let mut registry = JobRegistry::new(Duration::from_secs(5));
        registry.register(name, pipeline);
        Arc::new(registry)
    }

    async fn wait_for_status(registry: &JobRegistry, name: &str, expected: JobStatus) {
        for _ in 0..200 {
            if registry.state(name).map(|s| s.status) == Some(expected) {
                return;
            }
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
        panic!("job {name} never reached {expected}");
    }

    #[tokio::test]
    async fn test_registered_jobs_start_idle() {
        let mut registry = JobRegistry::new(Duration::from_secs(5));
        for name in ["elaboracao", "lgpd", "consulta"] {
            registry.register(name, Arc::new(CountingPipeline::new()));
        }

        let snapshot = registry.snapshot();
        assert_eq!(snapshot.len(), 3);
        assert!(snapshot.values().all(|s| *s == JobState::default()));
        assert_eq!(registry.names(), ["elaboracao", "lgpd", "consulta"]);
    }

    #[tokio::test]
    async fn test_unknown_job_leaves_registry_untouched() {
        let registry = registry_with("lgpd", Arc::new(CountingPipeline::new()));
        let before = registry.snapshot();

        let result = registry.trigger("financeiro");

        assert_eq!(result, Err(TriggerError::UnknownJob("financeiro".into())));
        assert_eq!(registry.snapshot(), before);
    }

    #[tokio::test]
    async fn test_successful_run_sets_sucesso_and_last_run() {
        let pipeline = Arc::new(CountingPipeline::new());
        let registry = registry_with("lgpd", pipeline.clone());

        registry.trigger("lgpd").unwrap();
        registry.wait("lgpd").await;

        let state = registry.state("lgpd").unwrap();
        assert_eq!(state.status, JobStatus::Sucesso);
        assert!(state.last_run.is_some());
        assert_eq!(pipeline.runs.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_failed_run_sets_erro_and_last_run() {
        let registry = registry_with("consulta", Arc::new(CountingPipeline::failing()));

        registry.trigger("consulta").unwrap();
        registry.wait("consulta").await;

        let state = registry.state("consulta").unwrap();
        assert_eq!(state.status, JobStatus::Erro);
        assert!(state.last_run.is_some());
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_triggers_start_a_single_run() {
        let gate = Arc::new(Notify::new());
        let pipeline = Arc::new(CountingPipeline::gated(gate.clone()));
        let registry = registry_with("elaboracao", pipeline.clone());

        let mut tasks = Vec::new();
        for _ in 0..32 {
            let registry = registry.clone();
            tasks.push(tokio::spawn(async move { registry.trigger("elaboracao") }));
        }

        let mut accepted = 0;
        let mut rejected = 0;
        for task in tasks {
            match task.await.unwrap() {
                Ok(()) => accepted += 1,
                Err(TriggerError::AlreadyRunning(_)) => rejected += 1,
                Err(other) => panic!("unexpected: {other:?}"),
            }
        }

        assert_eq!(accepted, 1);
        assert_eq!(rejected, 31);

        gate.notify_one();
        registry.wait("elaboracao").await;

        assert_eq!(pipeline.runs.load(Ordering::SeqCst), 1);
        assert_eq!(registry.state("elaboracao").unwrap().status, JobStatus::Sucesso);
    }

    #[tokio::test]
    async fn test_running_job_rejects_trigger_then_accepts_after_finish() {
        let gate = Arc::new(Notify::new());
        let pipeline = Arc::new(CountingPipeline::gated(gate.clone()));
        let registry = registry_with("lgpd", pipeline.clone());

        registry.trigger("lgpd").unwrap();
        wait_for_status(&registry, "lgpd", JobStatus::Executando).await;

        assert_eq!(
            registry.trigger("lgpd"),
            Err(TriggerError::AlreadyRunning("lgpd".into()))
        );

        gate.notify_one();
        registry.wait("lgpd").await;
        assert_eq!(registry.state("lgpd").unwrap().status, JobStatus::Sucesso);

        // Estado terminal permite novo disparo
        registry.trigger("lgpd").unwrap();
        gate.notify_one();
        registry.wait("lgpd").await;
        assert_eq!(pipeline.runs.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_snapshot_is_an_independent_copy() {
        let registry = registry_with("lgpd", Arc::new(CountingPipeline::new()));

        let mut snapshot = registry.snapshot();
        snapshot.get_mut("lgpd").unwrap().status = JobStatus::Erro;
        snapshot.insert("fake".into(), JobState::default());

        assert_eq!(registry.state("lgpd").unwrap().status, JobStatus::Idle);
        assert!(!registry.contains("fake"));
        assert_eq!(registry.snapshot().len(), 1);
    }

    #[tokio::test]
    async fn test_job_timeout_ends_in_erro() {
        let mut registry = JobRegistry::new(Duration::from_millis(50));
        registry.register("consulta", Arc::new(SlowPipeline));
        let registry = Arc::new(registry);

        registry.trigger("consulta").unwrap();
        registry.wait("consulta").await;

        let state = registry.state("consulta").unwrap();
        assert_eq!(state.status, JobStatus::Erro);
        assert!(state.last_run.is_some());
    }

    #[tokio::test]
    async fn test_panicking_pipeline_ends_in_erro() {
        let registry = registry_with("elaboracao", Arc::new(PanickingPipeline));

        registry.trigger("elaboracao").unwrap();
        registry.wait("elaboracao").await;

        assert_eq!(registry.state("elaboracao").unwrap().status, JobStatus::Erro);
    }

    #[tokio::test]
    async fn test_drain_waits_for_every_run() {
        let mut registry = JobRegistry::new(Duration::from_secs(5));
        registry.register("elaboracao", Arc::new(CountingPipeline::new()));
        registry.register("lgpd", Arc::new(CountingPipeline::failing()));
        let registry = Arc::new(registry);

        registry.trigger("elaboracao").unwrap();
        registry.trigger("lgpd").unwrap();
        registry.drain().await;

        let snapshot = registry.snapshot();
        assert_eq!(snapshot["elaboracao"].status, JobStatus::Sucesso);
        assert_eq!(snapshot["lgpd"].status, JobStatus::Erro);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_drain_waits_for_runs_from_racing_triggers() {
        let pipeline = Arc::new(CountingPipeline::new());
        let registry = registry_with("lgpd", pipeline.clone());
        let accepted = Arc::new(AtomicUsize::new(0));

        let mut tasks = Vec::new();
        for _ in 0..8 {
            let registry = registry.clone();
            let accepted = accepted.clone();
            tasks.push(tokio::spawn(async move {
                for _ in 0..50 {
                    if registry.trigger("lgpd").is_ok() {
                        accepted.fetch_add(1, Ordering::SeqCst);
                    }
                    tokio::task::yield_now().await;
                }
            }));
        }
        for task in tasks {
            task.await.unwrap();
        }

        registry.drain().await;

        assert!(!registry.state("lgpd").unwrap().status.is_active());
        assert_eq!(
            pipeline.runs.load(Ordering::SeqCst),
            accepted.load(Ordering::SeqCst)
        );
    }

    #[tokio::test]
    async fn test_source_failure_marks_erro_without_upserts() {
        let gate = Arc::new(Notify::new());
        let source = Arc::new(StubSource::failing("401 Unauthorized").gated(gate.clone()));
        let store = Arc::new(MemoryTaskStore::new());
        let sheet = Arc::new(StubSheet::with_keys(&["LCSD-1"]));
        let definition = JobDefinition::builtin().remove(0);
        let pipeline = SyncPipeline::new(definition, "LCSD", source, store.clone(), sheet.clone());
        let registry = registry_with("elaboracao", Arc::new(pipeline));

        registry.trigger("elaboracao").unwrap();
        let status = registry.state("elaboracao").unwrap().status;
        assert!(status.is_active());

        wait_for_status(&registry, "elaboracao", JobStatus::Executando).await;
        assert!(registry.state("elaboracao").unwrap().last_run.is_none());

        gate.notify_one();
        registry.wait("elaboracao").await;

        let state = registry.state("elaboracao").unwrap();
        assert_eq!(state.status, JobStatus::Erro);
        assert!(state.last_run.is_some());
        assert_eq!(store.calls(), 0);
        assert!(sheet.batches().is_empty());
    }

    #[tokio::test]
    async fn test_end_to_end_sync_run() {
        let source = Arc::new(StubSource::ok(vec![
            record("LCSD-1", "Revisão de CONSULTA JURÍDICA contrato X"),
            record("LCSD-2", "CONSULTA JURÍDICA trabalhista"),
        ]));
        let store = Arc::new(MemoryTaskStore::new());
        let sheet = Arc::new(StubSheet::with_keys(&["LCSD-1"]));
        let definition = JobDefinition::builtin()
            .into_iter()
            .find(|j| j.name == "consulta")
            .unwrap();
        let pipeline = SyncPipeline::new(definition, "LCSD", source, store.clone(), sheet.clone());
        let registry = registry_with("consulta", Arc::new(pipeline));

        registry.trigger("consulta").unwrap();
        registry.wait("consulta").await;

        assert_eq!(registry.state("consulta").unwrap().status, JobStatus::Sucesso);
        let batches = sheet.batches();
        assert_eq!(batches.len(), 1);
        assert_eq!(batches[0].1.len(), 2);
        assert_eq!(store.len(), 2);
    }
}
