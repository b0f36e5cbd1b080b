use std::sync::Arc;
use std::time::Duration;

use symbolview::view::TableKind;
use symbolview::{
    ControllerState, Module, ModuleSymbolController, PointerWidth, Symbol, SymbolViewConfig,
    SymbolViewError,
};

use crate::common::{
    kernel32, ntdll, panel, synthetic_symbols, two_module_engine, RecordingPresenter,
    ScriptedEngine, NTDLL_BASE,
};

#[test]
fn ntdll_select_then_search() {
    let engine = ScriptedEngine::new();
    engine.set_symbols(
        0x1000_0000,
        vec![Symbol::export(0x1000_1000, "NtCreateFile")],
    );
    let mut panel = panel(&engine);
    panel.module_list_replaced(vec![Module::new("ntdll.dll", 0x1000_0000)]);
    assert_eq!(
        panel.presenter().rows(TableKind::Modules),
        vec![vec!["10000000", "ntdll.dll"]]
    );

    panel.select_module("ntdll.dll").unwrap();
    let expected = vec![vec!["10001000", "Export", "NtCreateFile", ""]];
    assert_eq!(panel.presenter().rows(TableKind::Symbols), expected);

    panel.set_query("File").unwrap();
    assert_eq!(panel.presenter().rows(TableKind::Symbols), expected);

    panel.set_query("zzz").unwrap();
    assert!(panel.presenter().rows(TableKind::Symbols).is_empty());
}

#[test]
fn unavailable_engine_leaves_no_cache_entry() {
    let engine = two_module_engine();
    let mut panel = panel(&engine);
    panel.module_list_replaced(vec![ntdll(), kernel32()]);

    engine.set_unavailable(true);
    let err = panel.select_module("ntdll.dll").unwrap_err();
    assert!(matches!(err, SymbolViewError::EngineUnavailable));
    assert_eq!(panel.state(), &ControllerState::Idle);
    assert!(panel.presenter().rows(TableKind::Symbols).is_empty());
    assert!(!panel.store().is_cached(&ntdll()));

    engine.set_unavailable(false);
    assert_eq!(panel.select_module("ntdll.dll").unwrap(), 3);
    assert_eq!(engine.enumerations(NTDLL_BASE), 2);
}

#[test]
fn enumeration_failure_is_retried() {
    let engine = two_module_engine();
    engine.fail_module(NTDLL_BASE);
    let mut panel = panel(&engine);
    panel.module_list_replaced(vec![ntdll()]);

    assert!(matches!(
        panel.select_module("ntdll.dll"),
        Err(SymbolViewError::EnumerationFailure { .. })
    ));
    assert!(panel.store().is_empty());
    assert!(panel.select_module("ntdll.dll").is_err());
    assert_eq!(engine.enumerations(NTDLL_BASE), 2);
}

#[test]
fn empty_module_list_resets_from_any_state() {
    let engine = two_module_engine();
    let mut panel = panel(&engine);

    // Idle
    panel.module_list_replaced(Vec::new());
    assert_eq!(panel.state(), &ControllerState::Idle);

    // Loaded, with a search active
    panel.module_list_replaced(vec![ntdll(), kernel32()]);
    panel.select_module("kernel32.dll").unwrap();
    panel.set_query("create").unwrap();
    panel.module_list_replaced(Vec::new());

    assert_eq!(panel.state(), &ControllerState::Idle);
    assert!(panel.presenter().rows(TableKind::Symbols).is_empty());
    assert!(panel.presenter().rows(TableKind::Modules).is_empty());
    assert!(panel.store().is_empty());
    assert!(matches!(
        panel.set_query("x"),
        Err(SymbolViewError::NotLoaded)
    ));
}

#[test]
fn stale_selection_after_list_replacement() {
    let engine = two_module_engine();
    let mut panel = panel(&engine);
    panel.module_list_replaced(vec![ntdll(), kernel32()]);
    panel.module_list_replaced(vec![kernel32()]);

    // a selection queued against the old list
    assert!(matches!(
        panel.select_module("ntdll.dll"),
        Err(SymbolViewError::ModuleNotFound(_))
    ));
    assert!(panel.presenter().rows(TableKind::Symbols).is_empty());
    assert_eq!(engine.enumerations(NTDLL_BASE), 0);
}

#[test]
fn every_transition_publishes_symbols() {
    let engine = two_module_engine();
    let mut panel = panel(&engine);
    panel.module_list_replaced(vec![ntdll()]);
    let before = panel.presenter().updates.len();

    panel.select_module("ntdll.dll").unwrap();
    panel.set_query("nt").unwrap();

    let symbol_updates: Vec<usize> = panel.presenter().updates[before..]
        .iter()
        .filter(|u| u.kind == TableKind::Symbols)
        .map(|u| u.row_count())
        .collect();
    // Loading (empty), Loaded (identity), filtered
    assert_eq!(symbol_updates, vec![0, 3, 2]);
}

#[test]
fn module_reload_at_new_base_is_a_new_entry() {
    let engine = two_module_engine();
    engine.set_symbols(0x3000_0000, vec![Symbol::export(0x3000_1000, "NtOpenFile")]);
    let mut panel = panel(&engine);
    panel.module_list_replaced(vec![ntdll()]);
    panel.select_module("ntdll.dll").unwrap();

    panel.module_list_replaced(vec![Module::new("ntdll.dll", 0x3000_0000)]);
    assert_eq!(panel.state(), &ControllerState::Idle);
    assert_eq!(panel.select_module("ntdll.dll").unwrap(), 1);
    assert_eq!(
        panel.presenter().rows(TableKind::Symbols)[0][2],
        "NtOpenFile"
    );
}

#[test]
fn follow_actions_issue_commands() {
    let engine = two_module_engine();
    let mut panel = panel(&engine);
    panel.module_list_replaced(vec![ntdll(), kernel32()]);
    panel.select_module_row(1).unwrap();
    panel.set_query("createfilew").unwrap();

    panel.follow_symbol().unwrap();
    panel.toggle_breakpoint().unwrap();
    panel.follow_module_entry().unwrap();
    assert!(panel.toggle_bookmark().is_err());

    assert_eq!(
        engine.commands(),
        vec![
            "disasm 20002000",
            "bp 20002000",
            "disasm kernel32.dll:entry"
        ]
    );
}

#[test]
fn slow_enumeration_completes_on_default_config() {
    let engine = ScriptedEngine::new();
    engine.set_symbols(NTDLL_BASE, synthetic_symbols(NTDLL_BASE, 40));
    engine.set_delay(Duration::from_millis(2));

    // clock sampled on every symbol; the default guard must not trip
    let mut config = SymbolViewConfig::default();
    config.display.pointer_width = PointerWidth::Bits32;
    config.enumeration.check_interval = 1;
    let mut panel =
        ModuleSymbolController::new(Arc::clone(&engine), RecordingPresenter::default(), config);
    panel.module_list_replaced(vec![ntdll()]);

    assert_eq!(panel.select_module("ntdll.dll").unwrap(), 40);
    assert!(panel.store().is_cached(&ntdll()));
    assert_eq!(panel.select_module("ntdll.dll").unwrap(), 40);
    assert_eq!(engine.enumerations(NTDLL_BASE), 1);
}
