//! Integration tests for hot contexts and the update cycle

mod common;
use common::{event_log, harness, recording_registry, update_message, ScriptedLoader};
use esm_hmr::hmr::{apply_update, ModuleNamespace, Rejection, UpdateStatus};
use esm_hmr::{Dispatch, HmrConfig, ModuleId};
use std::cell::Cell;
use std::rc::Rc;

mod contexts {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_reacquire_keeps_id_and_locks() {
        let (registry, _) = recording_registry();
        for url in ["/a.js", "/nested/dir/b.js", "http://localhost:3000/c.mjs"] {
            let first = registry.create_hot_context(url).unwrap();
            let second = registry.create_hot_context(url).unwrap();
            assert_eq!(first.id(), second.id());
            assert!(first.is_locked());
            assert!(!second.is_locked());
        }
        assert_eq!(registry.len(), 3);
    }

    #[test]
    fn test_locked_accept_is_noop_dispose_is_not() {
        let (registry, _) = recording_registry();
        let stale = registry.acquire(ModuleId::new("/a.js"));
        let live = registry.acquire(ModuleId::new("/a.js"));

        stale.accept();
        stale.accept_with(|_| Ok(()));
        stale.dispose(|_| Ok(()));
        assert_eq!(live.accept_count(), 0);
        assert_eq!(live.dispose_count(), 1);

        live.accept();
        assert_eq!(live.accept_count(), 1);
    }

    #[test]
    fn test_lock_is_monotonic() {
        let (registry, _) = recording_registry();
        let first = registry.acquire(ModuleId::new("/a.js"));
        registry.acquire(ModuleId::new("/a.js"));
        registry.lookup(&ModuleId::new("/a.js"));
        registry.acquire(ModuleId::new("/a.js"));
        assert!(first.is_locked());
    }
}

mod cycles {
    use super::*;
    use pretty_assertions::assert_eq;

    #[tokio::test]
    async fn test_dispose_and_accept_scenario() {
        let (mut coordinator, reloads) = harness();
        let log = event_log();

        let (dispose_log, accept_log) = (Rc::clone(&log), Rc::clone(&log));
        let hot = coordinator.loader().evaluate("/a.js");
        hot.dispose(move |data| {
            dispose_log.borrow_mut().push("D".to_string());
            data.set("state", &"handed forward".to_string())?;
            Ok(())
        });
        hot.accept_with(move |args| {
            let state: Option<String> = args.data.get("state")?;
            let answer = args.module.get("answer").and_then(|v| v.as_i64());
            accept_log.borrow_mut().push(format!("A {:?} {:?}", state, answer));
            Ok(())
        });
        coordinator
            .loader()
            .define("/a.js", |_| ModuleNamespace::new().with_export("answer", 42));

        let dispatch = coordinator.handle_message(&update_message("/a.js")).await;

        let Dispatch::Applied(result) = dispatch else {
            panic!("expected applied, got {:?}", dispatch);
        };
        assert_eq!(result.status, UpdateStatus::Applied);
        assert!(result.reimported);
        assert_eq!(
            *log.borrow(),
            vec!["D".to_string(), r#"A Some("handed forward") Some(42)"#.to_string()]
        );

        let imports = coordinator.loader().imports.borrow();
        assert_eq!(imports.len(), 1);
        assert_eq!(imports[0].id, ModuleId::new("/a.js"));
        assert_eq!(imports[0].param, "mtime");
        assert!(imports[0].url().starts_with("/a.js?mtime="));
        assert!(reloads.borrow().is_empty());
    }

    #[tokio::test]
    async fn test_every_dispose_runs_before_any_accept() {
        let (mut coordinator, _) = harness();
        let log = event_log();

        let hot = coordinator.loader().evaluate("/a.js");
        for name in ["accept-1", "accept-2"] {
            let log = Rc::clone(&log);
            hot.accept_with(move |_| {
                log.borrow_mut().push(name.to_string());
                Ok(())
            });
        }
        hot.accept();
        for name in ["dispose-1", "dispose-2"] {
            let log = Rc::clone(&log);
            hot.dispose(move |_| {
                log.borrow_mut().push(name.to_string());
                Ok(())
            });
        }

        let dispatch = coordinator.handle_message(&update_message("/a.js")).await;
        let Dispatch::Applied(result) = dispatch else {
            panic!("expected applied");
        };
        assert_eq!((result.disposed, result.accepted), (2, 3));
        assert_eq!(*log.borrow(), vec!["dispose-1", "dispose-2", "accept-1", "accept-2"]);
    }

    #[tokio::test]
    async fn test_callbacks_empty_after_cycle_without_reregistration() {
        let (mut coordinator, _) = harness();
        let hot = coordinator.loader().evaluate("/a.js");
        hot.accept();
        hot.dispose(|_| Ok(()));

        coordinator.handle_message(&update_message("/a.js")).await;

        let live = coordinator.registry().lookup(&ModuleId::new("/a.js")).unwrap();
        assert_eq!(live.accept_count(), 0);
        assert_eq!(live.dispose_count(), 0);
        assert!(hot.is_locked());
    }

    #[tokio::test]
    async fn test_second_cycle_sees_only_current_registrations() {
        let (mut coordinator, _) = harness();
        let log = event_log();
        let version = Rc::new(Cell::new(0));

        let body_log = Rc::clone(&log);
        coordinator.loader().define("/a.js", move |hot| {
            version.set(version.get() + 1);
            let v = version.get();
            let (dispose_log, accept_log) = (Rc::clone(&body_log), Rc::clone(&body_log));
            hot.dispose(move |_| {
                dispose_log.borrow_mut().push(format!("dispose v{}", v));
                Ok(())
            });
            hot.accept_with(move |_| {
                accept_log.borrow_mut().push(format!("accept v{}", v));
                Ok(())
            });
            ModuleNamespace::new().with_export("version", v)
        });
        coordinator.loader().evaluate("/a.js");

        coordinator.handle_message(&update_message("/a.js")).await;
        coordinator.handle_message(&update_message("/a.js")).await;

        assert_eq!(
            *log.borrow(),
            vec!["dispose v1", "accept v1", "dispose v2", "accept v2"]
        );
        let live = coordinator.registry().lookup(&ModuleId::new("/a.js")).unwrap();
        assert_eq!((live.accept_count(), live.dispose_count()), (1, 1));

        let imports = coordinator.loader().imports.borrow();
        assert_eq!(imports.len(), 2);
        assert!(imports[0].token < imports[1].token);
    }

    #[tokio::test]
    async fn test_hot_data_is_fresh_per_cycle() {
        let (mut coordinator, _) = harness();
        let seen = event_log();

        let first = coordinator.loader().evaluate("/a.js");
        first.dispose(|data| {
            data.set("count", &1u32)?;
            Ok(())
        });
        let accept_seen = Rc::clone(&seen);
        coordinator.loader().define("/a.js", move |hot| {
            let seen = Rc::clone(&accept_seen);
            hot.accept_with(move |args| {
                let count: Option<u32> = args.data.get("count")?;
                seen.borrow_mut().push(format!("{:?}", count));
                Ok(())
            });
            ModuleNamespace::new()
        });
        first.accept();

        // Cycle 1: side-effect-only accept; the re-import registers the callback
        coordinator.handle_message(&update_message("/a.js")).await;
        // Cycle 2: nothing disposed, so the data bag is empty
        coordinator.handle_message(&update_message("/a.js")).await;

        assert_eq!(*seen.borrow(), vec!["None"]);
    }

    #[tokio::test]
    async fn test_dispose_only_update_skips_reimport() {
        let (mut coordinator, reloads) = harness();
        let disposed = Rc::new(Cell::new(false));
        let flag = Rc::clone(&disposed);
        let hot = coordinator.loader().evaluate("/a.js");
        hot.dispose(move |_| {
            flag.set(true);
            Ok(())
        });

        let dispatch = coordinator.handle_message(&update_message("/a.js")).await;
        let Dispatch::Applied(result) = dispatch else {
            panic!("expected applied");
        };
        assert!(disposed.get());
        assert!(!result.reimported);
        assert_eq!(coordinator.loader().import_count(), 0);
        assert!(reloads.borrow().is_empty());
    }

    #[tokio::test]
    async fn test_rejections_never_import() {
        let (registry, _) = recording_registry();
        let loader = ScriptedLoader::new(registry.clone());
        let config = HmrConfig::default();

        let declined = loader.evaluate("/b.js");
        declined.accept();
        declined.decline();
        loader.evaluate("/c.css").accept();

        let cases = [
            ("/b.js", Rejection::Declined),
            ("/c.css", Rejection::NotExecutable),
            ("/missing.js", Rejection::UnknownModule),
        ];
        for (id, rejection) in cases {
            let result = apply_update(&registry, &loader, &config, &ModuleId::new(id), 1)
                .await
                .unwrap();
            assert_eq!(result.status, UpdateStatus::NotApplied(rejection));
            assert!(!result.reimported);
        }
        assert_eq!(loader.import_count(), 0);
        assert_eq!(declined.accept_count(), 1);
    }

    #[tokio::test]
    async fn test_custom_extensions_and_param() {
        let (registry, _) = recording_registry();
        let loader = ScriptedLoader::new(registry.clone());
        let config = HmrConfig {
            executable_extensions: vec![".js".to_string(), ".mjs".to_string()],
            cache_bust_param: "t".to_string(),
            ..HmrConfig::default()
        };
        loader.evaluate("/lib.mjs").accept();

        let result = apply_update(&registry, &loader, &config, &ModuleId::new("/lib.mjs"), 9)
            .await
            .unwrap();
        assert!(result.is_applied());
        assert_eq!(loader.imports.borrow()[0].url(), "/lib.mjs?t=9");
    }
}
