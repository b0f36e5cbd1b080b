use std::sync::Arc;
use std::time::Duration;

use symbolview::view::TableKind;
use symbolview::{ControllerState, ModuleSymbolController, SymbolViewConfig, SymbolViewError};

use crate::common::{
    kernel32, ntdll, panel, synthetic_symbols, two_module_engine, RecordingPresenter,
    ScriptedEngine, KERNEL32_BASE, NTDLL_BASE,
};

#[tokio::test]
async fn background_selection_publishes_on_completion() {
    let engine = two_module_engine();
    let mut panel = panel(&engine);
    panel.module_list_replaced(vec![ntdll(), kernel32()]);

    let pending = panel.begin_select_module("ntdll.dll").unwrap().unwrap();
    assert_eq!(panel.state(), &ControllerState::Loading(ntdll()));
    assert!(panel.presenter().rows(TableKind::Symbols).is_empty());

    let done = pending.finish().await;
    assert!(panel.complete_enumeration(done).unwrap());
    assert_eq!(panel.state(), &ControllerState::Loaded(ntdll()));
    assert_eq!(panel.presenter().rows(TableKind::Symbols).len(), 3);
    assert!(panel.store().is_cached(&ntdll()));
}

#[tokio::test]
async fn newer_selection_supersedes_slow_enumeration() {
    let engine = ScriptedEngine::new();
    engine.set_symbols(NTDLL_BASE, synthetic_symbols(NTDLL_BASE, 200));
    engine.set_symbols(KERNEL32_BASE, synthetic_symbols(KERNEL32_BASE, 2));
    engine.set_delay(Duration::from_millis(2));
    let mut panel = panel(&engine);
    panel.module_list_replaced(vec![ntdll(), kernel32()]);

    let slow = panel.begin_select_module("ntdll.dll").unwrap().unwrap();
    let fast = panel.begin_select_module("kernel32.dll").unwrap().unwrap();
    assert!(slow.token().is_cancelled());

    let fast_done = fast.finish().await;
    assert!(panel.complete_enumeration(fast_done).unwrap());

    // the superseded drain finishes (or is cancelled) later and must not win
    let slow_done = slow.finish().await;
    assert!(!panel.complete_enumeration(slow_done).unwrap());
    assert_eq!(panel.state(), &ControllerState::Loaded(kernel32()));
    assert_eq!(panel.presenter().rows(TableKind::Symbols).len(), 2);
    assert!(!panel.store().is_cached(&ntdll()));
}

#[tokio::test]
async fn query_during_loading_is_rejected() {
    let engine = two_module_engine();
    let mut panel = panel(&engine);
    panel.module_list_replaced(vec![ntdll()]);
    let pending = panel.begin_select_module("ntdll.dll").unwrap().unwrap();
    assert!(matches!(
        panel.set_query("nt"),
        Err(SymbolViewError::NotLoaded)
    ));
    let done = pending.finish().await;
    panel.complete_enumeration(done).unwrap();
    assert_eq!(panel.set_query("nt").unwrap(), 2);
}

#[tokio::test]
async fn process_exit_during_loading_discards_result() {
    let engine = two_module_engine();
    let mut panel = panel(&engine);
    panel.module_list_replaced(vec![ntdll()]);
    let pending = panel.begin_select_module("ntdll.dll").unwrap().unwrap();

    panel.module_list_replaced(Vec::new());
    assert!(pending.token().is_cancelled());

    let done = pending.finish().await;
    assert!(!panel.complete_enumeration(done).unwrap());
    assert_eq!(panel.state(), &ControllerState::Idle);
    assert!(panel.store().is_empty());
}

#[tokio::test]
async fn background_timeout_returns_to_idle() {
    let engine = ScriptedEngine::new();
    // ~2.5s of draining against a 1s wait
    engine.set_symbols(NTDLL_BASE, synthetic_symbols(NTDLL_BASE, 500));
    engine.set_delay(Duration::from_millis(5));

    let mut config = SymbolViewConfig::default();
    config.enumeration.async_timeout_seconds = 1;
    let mut panel =
        ModuleSymbolController::new(Arc::clone(&engine), RecordingPresenter::default(), config);
    panel.module_list_replaced(vec![ntdll()]);

    let pending = panel.begin_select_module("ntdll.dll").unwrap().unwrap();
    let token = pending.token().clone();
    let done = pending.finish().await;
    assert!(token.is_cancelled());

    let err = panel.complete_enumeration(done).unwrap_err();
    assert!(matches!(err, SymbolViewError::Timeout { .. }));
    assert_eq!(panel.state(), &ControllerState::Idle);
    assert!(!panel.store().is_cached(&ntdll()));
}

#[tokio::test]
async fn background_failure_is_not_cached() {
    let engine = two_module_engine();
    engine.set_unavailable(true);
    let mut panel = panel(&engine);
    panel.module_list_replaced(vec![ntdll()]);

    let done = panel
        .begin_select_module("ntdll.dll")
        .unwrap()
        .unwrap()
        .finish()
        .await;
    assert!(matches!(
        panel.complete_enumeration(done),
        Err(SymbolViewError::EngineUnavailable)
    ));
    assert!(panel.store().is_empty());
    assert_eq!(engine.enumerations(NTDLL_BASE), 1);
}
