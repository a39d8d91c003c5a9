use anyhow::Result;
use metascout::{
    search, CancellationToken, Hit, MemberKind, Module, ModuleBuilder, NamespaceSearchStrategy,
    ResultQueue, ResultSink, ScopedSearchStrategy, SearchConfig, SearchMode, SearchSession,
    SearchStrategy, SearchTerms,
};
use rayon::prelude::*;
use std::fs;
use std::num::NonZeroUsize;
use std::sync::Arc;
use tempfile::tempdir;

fn library_module(name: &str, namespaces: &[&str]) -> Arc<Module> {
    let mut builder = ModuleBuilder::new(name).full_name(format!("{}, Version=1.0.0.0", name));
    for ns in namespaces {
        builder = builder
            .add_member(ns, "Reader", "Read", MemberKind::Method)
            .add_member(ns, "Reader", ".ctor", MemberKind::Constructor)
            .add_member(ns, "ReaderOptions", "BufferSize", MemberKind::Property);
    }
    Arc::new(builder.build())
}

fn sample_modules() -> Vec<Arc<Module>> {
    vec![
        library_module("Acme.Core", &["Acme.IO", "Acme.IO.Compression", "Acme.Text"]),
        library_module("Acme.Net", &["Acme.Net", "Acme.Net.Http"]),
        Arc::new(
            ModuleBuilder::new("Empty")
                .add_namespace("Acme.Placeholder")
                .build(),
        ),
        Arc::new(
            ModuleBuilder::new("Broken")
                .add_type("Acme.IO", "Reader")
                .unresolvable()
                .build(),
        ),
    ]
}

fn config(terms: &[&str], mode: SearchMode) -> SearchConfig {
    SearchConfig {
        terms: terms.iter().map(|t| t.to_string()).collect(),
        mode,
        thread_count: NonZeroUsize::new(4).unwrap(),
        max_results: 0,
        ..SearchConfig::default()
    }
}

fn names(results: &[Hit]) -> Vec<String> {
    let mut names: Vec<String> = results
        .iter()
        .map(|r| format!("{}:{}", r.location(), r.name()))
        .collect();
    names.sort();
    names
}

#[test]
fn test_load_and_search_from_disk() -> Result<()> {
    let dir = tempdir()?;
    let yaml = dir.path().join("core.yaml");
    let json = dir.path().join("net.json");
    fs::write(
        &yaml,
        r#"
name: Acme.Core
namespaces:
  - name: Acme.IO
    types:
      - name: FileReader
        members:
          - { name: ReadAll, kind: method }
"#,
    )?;
    fs::write(
        &json,
        r#"{"name": "Acme.Net", "namespaces": [{"name": "Acme.Net", "types": [{"name": "StreamReader"}]}]}"#,
    )?;

    let config = SearchConfig {
        module_paths: vec![yaml, json],
        ..config(&["read"], SearchMode::TypesAndMembers)
    };
    let modules = config.load_modules()?;
    let summary = search(&config, &modules, &CancellationToken::new())?;

    assert_eq!(summary.modules_searched, 2);
    assert_eq!(
        names(&summary.results),
        vec![
            "Acme.Core:FileReader",
            "Acme.Core:ReadAll",
            "Acme.Net:StreamReader"
        ]
    );
    Ok(())
}

#[test]
fn test_namespace_results_own_types_and_match_terms() -> Result<()> {
    let modules = sample_modules();
    let summary = search(&config(&["acme"], SearchMode::Namespace), &modules, &CancellationToken::new())?;

    for result in &summary.results {
        let Hit::Namespace(ns) = result else {
            panic!("unexpected result kind {}", result.kind());
        };
        assert!(!ns.namespace.types().is_empty());
        assert!(ns.name.to_lowercase().contains("acme"));
    }
    // "Acme" itself owns nothing, "Acme.Placeholder" owns nothing, and the
    // unresolvable module contributes nothing.
    assert_eq!(summary.results.len(), 5);
    Ok(())
}

#[test]
fn test_module_check_agrees_with_search() -> Result<()> {
    let modules: Vec<_> = sample_modules()
        .into_iter()
        .filter(|m| m.type_system().is_some())
        .collect();

    for term in ["io", "net", "http", "placeholder", "acme", "zzz", "~ahtp", "=Acme.Text"] {
        for module in &modules {
            let queue = Arc::new(ResultQueue::new());
            let strategy = NamespaceSearchStrategy::new(queue.clone(), SearchTerms::single(term)?);
            strategy.search(module, &CancellationToken::new())?;
            assert_eq!(
                strategy.is_match_module(module),
                !queue.is_empty(),
                "term {} in module {}",
                term,
                module.name()
            );
        }
    }
    Ok(())
}

#[test]
fn test_shorter_names_rank_first() -> Result<()> {
    let summary = search(
        &config(&["reader"], SearchMode::Type),
        &sample_modules(),
        &CancellationToken::new(),
    )?;
    assert!(!summary.results.is_empty());
    for pair in summary.results.windows(2) {
        assert!(pair[0].fitness() >= pair[1].fitness());
        if pair[0].name().len() < pair[1].name().len() {
            assert!(pair[0].fitness() > pair[1].fitness());
        }
    }
    assert_eq!(summary.results[0].name(), "Reader");
    Ok(())
}

#[test]
fn test_scoped_search_skips_modules_outside_scope() -> Result<()> {
    let module = Arc::new(ModuleBuilder::new("X").add_type("X.B", "Widget").build());
    let queue = Arc::new(ResultQueue::new());

    let delegate = NamespaceSearchStrategy::new(queue.clone(), SearchTerms::single("B")?);
    delegate.search(&module, &CancellationToken::new())?;
    assert_eq!(queue.drain().len(), 1);

    let scope: Vec<Arc<dyn SearchStrategy>> = vec![Arc::new(NamespaceSearchStrategy::new(
        queue.clone(),
        SearchTerms::single("A")?,
    ))];
    let scoped = ScopedSearchStrategy::new(scope).with_strategy(Arc::new(delegate));
    assert!(!scoped.is_match_module(&module));
    scoped.search(&module, &CancellationToken::new())?;
    assert!(queue.is_empty());
    Ok(())
}

#[test]
fn test_scope_terms_from_query_text() -> Result<()> {
    let summary = search(
        &config(&["reader inns:compression inasm:core"], SearchMode::Type),
        &sample_modules(),
        &CancellationToken::new(),
    )?;
    let found = names(&summary.results);
    assert_eq!(found, vec!["Acme.Core:Reader", "Acme.Core:ReaderOptions"]);
    for result in &summary.results {
        let Hit::Member(m) = result else {
            panic!("unexpected result kind {}", result.kind());
        };
        assert_eq!(m.member.namespace(), "Acme.IO.Compression");
    }
    Ok(())
}

#[test]
fn test_constructor_search() -> Result<()> {
    let summary = search(
        &config(&["ctor inasm:net"], SearchMode::Member),
        &sample_modules(),
        &CancellationToken::new(),
    )?;
    assert_eq!(summary.results.len(), 2);
    assert!(summary
        .results
        .iter()
        .all(|r| r.fitness() == 1.0 / "Reader".len() as f32));
    Ok(())
}

#[test]
fn test_cancelled_session_emits_nothing() -> Result<()> {
    let cancel = CancellationToken::new();
    cancel.cancel();
    let summary = search(&config(&["reader"], SearchMode::TypesAndMembers), &sample_modules(), &cancel)?;
    assert!(summary.cancelled);
    assert!(summary.results.is_empty());
    assert_eq!(summary.modules_searched, 0);
    Ok(())
}

#[test]
fn test_concurrent_sessions_share_modules() -> Result<()> {
    let modules = sample_modules();
    let session = SearchSession::new(&config(&[], SearchMode::Type))?;

    let counts: Vec<usize> = (0..8)
        .into_par_iter()
        .map(|_| {
            let queue = Arc::new(ResultQueue::new());
            let strategy = NamespaceSearchStrategy::new(queue.clone(), SearchTerms::single("acme").unwrap());
            let summary = session.run(&strategy, queue.as_ref(), &modules, &CancellationToken::new());
            summary.results.len()
        })
        .collect();

    assert!(counts.iter().all(|&c| c == 5));
    let stats = session.metrics().get_stats();
    assert_eq!(stats.modules_searched, 8 * modules.len() as u64);
    Ok(())
}
