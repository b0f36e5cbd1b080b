use std::sync::Arc;

use symbolview::config::EnumerationConfig;
use symbolview::view::TableKind;
use symbolview::{
    FilterIndex, FilterQuery, FilteredView, PointerWidth, SymbolSet, SymbolStore,
};

use crate::common::{
    kernel32, ntdll, panel, synthetic_symbols, two_module_engine, ScriptedEngine, KERNEL32_BASE,
    NTDLL_BASE,
};

#[test]
fn cache_hit_returns_same_instance() {
    let engine = two_module_engine();
    let mut store = SymbolStore::new(Arc::clone(&engine), EnumerationConfig::default());
    let first = store.get_symbols(&ntdll()).unwrap();
    let second = store.get_symbols(&ntdll()).unwrap();
    assert!(Arc::ptr_eq(&first, &second));
    assert_eq!(engine.enumerations(NTDLL_BASE), 1);
}

#[test]
fn selection_churn_never_reenumerates() {
    let engine = two_module_engine();
    let mut panel = panel(&engine);
    panel.module_list_replaced(vec![ntdll(), kernel32()]);

    for _ in 0..3 {
        panel.select_module("ntdll.dll").unwrap();
        panel.select_module("kernel32.dll").unwrap();
    }
    assert_eq!(engine.enumerations(NTDLL_BASE), 1);
    assert_eq!(engine.enumerations(KERNEL32_BASE), 1);
}

#[test]
fn empty_query_is_identity() {
    let sets = [
        SymbolSet::default(),
        SymbolSet::new(synthetic_symbols(0x1000, 7)),
    ];
    for set in &sets {
        let mut index = FilterIndex::for_symbols(set, PointerWidth::Bits64, true);
        assert_eq!(
            index.apply(&FilterQuery::from_column("", 1)),
            FilteredView::identity(set.len())
        );
    }
}

#[test]
fn appending_characters_only_narrows() {
    let set = SymbolSet::new(synthetic_symbols(0x4000_0000, 2_000));
    let mut index = FilterIndex::for_symbols(&set, PointerWidth::Bits32, true);
    let typed = "fn00123_file";
    let mut previous = index.apply(&FilterQuery::from_column("", 1));
    for end in 1..=typed.len() {
        let current = index.apply(&FilterQuery::from_column(&typed[..end], 1));
        assert!(
            current.rows().iter().all(|r| previous.rows().contains(r)),
            "query {:?} widened the result",
            &typed[..end]
        );
        assert!(current.rows().windows(2).all(|w| w[0] < w[1]));
        previous = current;
    }
    assert!(!previous.is_empty());
}

#[test]
fn incremental_and_full_scans_agree() {
    let set = SymbolSet::new(synthetic_symbols(0x4000_0000, 5_000));
    let mut incremental = FilterIndex::for_symbols(&set, PointerWidth::Bits32, true);
    let mut full = FilterIndex::for_symbols(&set, PointerWidth::Bits32, false);
    for q in ["f", "fn", "fn0", "fn00", "fn0", "reg", "REG", "import", "fn04999"] {
        let query = FilterQuery::from_column(q, 1);
        assert_eq!(incremental.apply(&query), full.apply(&query), "query {q}");
    }
}

#[test]
fn live_search_does_not_touch_engine() {
    let engine = ScriptedEngine::new();
    engine.set_symbols(NTDLL_BASE, synthetic_symbols(NTDLL_BASE, 20_000));
    let mut panel = panel(&engine);
    panel.module_list_replaced(vec![ntdll()]);
    assert_eq!(panel.select_module("ntdll.dll").unwrap(), 20_000);

    for q in ["f", "fi", "fil", "file", "fil", ""] {
        panel.set_query(q).unwrap();
    }
    assert_eq!(engine.enumerations(NTDLL_BASE), 1);
    assert_eq!(panel.presenter().rows(TableKind::Symbols).len(), 20_000);
}

#[test]
fn latest_query_wins() {
    let engine = two_module_engine();
    let mut panel = panel(&engine);
    panel.module_list_replaced(vec![ntdll()]);
    panel.select_module("ntdll.dll").unwrap();

    panel.set_query("rtl").unwrap();
    panel.set_query("ntc").unwrap();
    let rows = panel.presenter().rows(TableKind::Symbols);
    assert_eq!(rows.len(), 2);
    assert!(rows.iter().all(|r| r[2].to_lowercase().contains("ntc")));
    assert_eq!(panel.symbol_query(), "ntc");
}

#[test]
fn republishing_is_idempotent() {
    let engine = two_module_engine();
    let mut panel = panel(&engine);
    panel.module_list_replaced(vec![ntdll()]);
    panel.select_module("ntdll.dll").unwrap();

    panel.set_query("nt").unwrap();
    let first = panel.presenter().last(TableKind::Symbols).cloned().unwrap();
    panel.set_query("nt").unwrap();
    let second = panel.presenter().last(TableKind::Symbols).cloned().unwrap();
    assert_eq!(first, second);
}
