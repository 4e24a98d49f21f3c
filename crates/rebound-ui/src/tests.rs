#[cfg(test)]
mod tests {
    use std::cell::Cell;
    use std::rc::Rc;

    use rebound_core::*;
    use rebound_devtools::{MemoryExtension, Message};
    use serde::{Deserialize, Serialize};
    use serde_json::json;

    use crate::*;

    #[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
    struct Count {
        count: i32,
    }

    fn number_view(props: &i32) -> View {
        View::new("span").attr("number", props)
    }

    fn count_view(props: &Count) -> View {
        View::new("span").attr("count", props.count)
    }

    fn number_comp() -> FnComponent<i32, fn(&i32) -> View> {
        component(number_view as fn(&i32) -> View).named("NumberComp")
    }

    fn as_number() -> PropsRule<i32, (), i32> {
        PropsRule::derive(|v: &i32, _: &()| *v)
    }

    fn rendered_number<C: Component>(root: &Root<C>) -> Option<String> {
        root.output()
            .and_then(|v| v.get("number").map(str::to_string))
    }

    #[test]
    fn test_last_synchronous_value_wins() {
        let container = inject(Stream::of([0, 1, 2]), as_number()).wrap(number_comp());
        let root = Root::mount(container, ());

        assert_eq!(rendered_number(&root).as_deref(), Some("2"));
        assert_eq!(root.frames(), 1);
        root.unmount();
    }

    #[test]
    fn test_static_rule_ignores_stream_values() {
        let counts = Subject::<Count>::new();
        let container = inject(counts.as_stream(), PropsRule::fixed(Count { count: 5000 }))
            .wrap(component(count_view));
        let root = Root::mount(container, ());
        assert!(root.output().is_none());

        counts.next(Count { count: 0 });
        assert_eq!(root.output().unwrap().get("count"), Some("5000"));
        counts.next(Count { count: 1 });
        assert_eq!(root.output().unwrap().get("count"), Some("5000"));
        root.unmount();
    }

    #[test]
    fn test_renders_nothing_until_first_value() {
        let values = Subject::<i32>::new();
        let root = Root::mount(inject(values.as_stream(), as_number()).wrap(number_comp()), ());

        assert!(root.output().is_none());
        assert_eq!(root.with_component(|c| c.phase()), Phase::Awaiting);

        values.next(7);
        assert_eq!(rendered_number(&root).as_deref(), Some("7"));
        assert_eq!(root.with_component(|c| c.phase()), Phase::Rendering);
        root.unmount();
    }

    #[test]
    fn test_every_emission_rerenders_in_order() {
        let values = Subject::<i32>::new();
        let seen = Rc::new(std::cell::RefCell::new(Vec::new()));
        let s = seen.clone();
        let presenter = component(move |n: &i32| {
            s.borrow_mut().push(*n);
            number_view(n)
        });
        let root = Root::mount(inject(values.as_stream(), as_number()).wrap(presenter), ());

        for n in [3, 1, 2] {
            values.next(n);
        }
        assert_eq!(*seen.borrow(), vec![3, 1, 2]);
        root.unmount();
    }

    #[test]
    fn test_unmount_before_first_value_is_clean() {
        let values = Subject::<i32>::new();
        let root = Root::mount(inject(values.as_stream(), as_number()).wrap(number_comp()), ());
        assert_eq!(values.subscriber_count(), 1);

        root.unmount();
        assert_eq!(values.subscriber_count(), 0);
        assert_eq!(root.with_component(|c| c.phase()), Phase::Finished);
        assert!(root.fault().is_none());

        values.next(1);
        assert!(root.output().is_none());
        root.unmount();
    }

    #[test]
    fn test_failed_source_resolution_faults_and_still_unmounts() {
        let _ = env_logger::builder().is_test(true).try_init();
        let source: Source<i32, ()> =
            Source::try_deferred(|_| Err(Error::Source("no stream for these props".into())));
        let root = Root::mount(inject(source, as_number()).wrap(number_comp()), ());

        assert!(matches!(root.fault(), Some(Error::Source(_))));
        assert!(root.output().is_none());
        root.unmount();
        assert_eq!(root.with_component(|c| c.phase()), Phase::Finished);
    }

    #[test]
    fn test_stream_failure_faults_the_subtree() {
        let _ = env_logger::builder().is_test(true).try_init();
        let values = Subject::<i32>::new();
        let root = Root::mount(inject(values.as_stream(), as_number()).wrap(number_comp()), ());
        values.next(1);
        values.error(StreamError::new("upstream gone"));

        assert_eq!(
            root.fault(),
            Some(Error::Stream(StreamError::new("upstream gone")))
        );
        assert!(root.output().is_none());
        root.unmount();
    }

    #[derive(Clone)]
    struct Props {
        user: String,
        suffix: &'static str,
    }

    #[test]
    fn test_deferred_source_is_resolved_once_with_mount_props() {
        let resolved = Rc::new(std::cell::RefCell::new(Vec::new()));
        let r = resolved.clone();
        let source = Source::deferred(move |p: &Props| {
            r.borrow_mut().push(p.user.clone());
            Stream::of([p.user.len() as i32])
        });
        let rule = PropsRule::derive(|len: &i32, p: &Props| format!("{len}{}", p.suffix));
        let presenter = component(|label: &String| View::text(label)).named("Greeting");
        let container = inject(source, rule).wrap(presenter);
        let root = Root::mount(
            container,
            Props {
                user: "ada".into(),
                suffix: "!",
            },
        );
        assert_eq!(root.output().unwrap().text_content(), "3!");

        root.set_props(Props {
            user: "grace".into(),
            suffix: "?",
        });
        assert_eq!(root.output().unwrap().text_content(), "3?");
        assert_eq!(*resolved.borrow(), vec!["ada".to_string()]);
        root.unmount();
    }

    #[test]
    fn test_store_driven_container() {
        let actions = create_action::<Reducer<Count>>();
        let store = StoreBuilder::new("counter", actions.as_stream())
            .initial(Count { count: 1 })
            .build();
        let root = Root::mount(
            inject(store, PropsRule::derive(|c: &Count, _: &()| c.clone()))
                .wrap(component(count_view)),
            (),
        );
        assert_eq!(root.output().unwrap().get("count"), Some("1"));

        actions.next(reducer(|c: &Count| Count { count: c.count + 1 }));
        assert_eq!(root.output().unwrap().get("count"), Some("2"));

        root.unmount();
        assert_eq!(actions.subscriber_count(), 0);
    }

    #[test]
    fn test_devtools_session_mirrors_and_replays() {
        let ext = MemoryExtension::new();
        let values = Subject::<i32>::new();
        let container = inject(values.as_stream(), as_number())
            .devtools(ext.as_extension())
            .wrap(number_comp());
        assert_eq!(container.label(), "NumberCompContainer");

        let root = Root::mount(container, ());
        assert_eq!(ext.labels(), vec![Some("NumberCompContainer".to_string())]);

        values.next(1);
        assert_eq!(ext.sent(), vec![("update".to_string(), json!(1))]);

        ext.dispatch(&Message::dispatch("JUMP_TO_STATE", Some("42".into())));
        assert_eq!(rendered_number(&root).as_deref(), Some("42"));

        ext.dispatch(&Message::dispatch("IMPORT_STATE", Some("99".into())));
        assert_eq!(rendered_number(&root).as_deref(), Some("42"));

        ext.dispatch(&Message::dispatch("JUMP_TO_ACTION", Some("5".into())));
        assert_eq!(rendered_number(&root).as_deref(), Some("5"));

        root.unmount();
        assert_eq!(ext.listeners(), 0);
        assert_eq!(ext.disconnects(), 1);
    }

    #[test]
    fn test_replay_before_first_emission_renders() {
        let ext = MemoryExtension::new();
        let root = Root::mount(
            inject(Stream::<i32>::never(), as_number())
                .devtools(ext.as_extension())
                .wrap(number_comp()),
            (),
        );
        assert!(root.output().is_none());

        ext.dispatch(&Message::dispatch("JUMP_TO_STATE", Some("42".into())));
        assert_eq!(rendered_number(&root).as_deref(), Some("42"));
        root.unmount();
    }

    #[test]
    fn test_malformed_replay_payload_faults() {
        let ext = MemoryExtension::new();
        let root = Root::mount(
            inject(Stream::of([1]), as_number())
                .devtools(ext.as_extension())
                .wrap(number_comp()),
            (),
        );
        ext.dispatch(&Message::dispatch("JUMP_TO_STATE", Some("{".into())));
        assert!(matches!(root.fault(), Some(Error::Replay(_))));
        root.unmount();
        assert_eq!(ext.disconnects(), 1);
    }

    #[test]
    fn test_probed_extension_only_in_development() {
        let ext = MemoryExtension::new();
        rebound_devtools::install(ext.as_extension());

        let prod = Root::mount(
            inject(Stream::of([1]), as_number()).wrap(number_comp()),
            (),
        );
        assert!(ext.labels().is_empty());
        prod.unmount();

        let dev = Root::mount(
            inject(Stream::of([1]), as_number())
                .config(Config::development())
                .wrap(number_comp()),
            (),
        );
        assert_eq!(ext.labels(), vec![Some("NumberCompContainer".to_string())]);
        dev.unmount();

        let off = Root::mount(
            inject(Stream::of([1]), as_number())
                .config(Config::development())
                .without_devtools()
                .wrap(number_comp()),
            (),
        );
        assert_eq!(ext.labels().len(), 1);
        off.unmount();

        rebound_devtools::uninstall();
    }

    #[test]
    fn test_failed_resolution_still_closes_devtools_session() {
        let ext = MemoryExtension::new();
        let source: Source<i32, ()> = Source::try_deferred(|_| Err(Error::Source("nope".into())));
        let root = Root::mount(
            inject(source, as_number())
                .devtools(ext.as_extension())
                .wrap(number_comp()),
            (),
        );
        assert!(root.fault().is_some());
        root.unmount();
        assert_eq!(ext.listeners(), 0);
        assert_eq!(ext.disconnects(), 1);
    }

    #[test]
    fn test_one_injector_many_containers() {
        let connects = Rc::new(Cell::new(0));
        let c = connects.clone();
        let values = Subject::<i32>::new();
        let upstream = values.as_stream();
        let counted = Stream::new(move |sub| {
            c.set(c.get() + 1);
            upstream.subscribe_with(sub)
        });
        let injector = inject(counted.share_replay(), as_number());

        let a = Root::mount(injector.wrap(number_comp()), ());
        let b = Root::mount(injector.wrap(number_comp()), ());
        values.next(9);
        assert_eq!(rendered_number(&a).as_deref(), Some("9"));
        assert_eq!(rendered_number(&b).as_deref(), Some("9"));
        assert_eq!(connects.get(), 1);

        a.unmount();
        b.unmount();
        assert_eq!(values.subscriber_count(), 0);
    }

    #[test]
    fn test_wrapper_mounts_a_presenter_directly() {
        let root = Root::mount(Wrapper::new(number_comp()), 4);
        assert_eq!(root.name(), "NumberCompWrapper");
        assert_eq!(rendered_number(&root).as_deref(), Some("4"));
        assert_eq!(present(&number_comp(), &5).get("number"), Some("5"));
    }
}
