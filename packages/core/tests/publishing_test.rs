//! Versioning and Publishing Integration Tests
//!
//! Covers the version lifecycle end to end against an `InMemoryStore`:
//!
//! - Archiving the live state as a previous version
//! - Drafts edited detached from the live tree
//! - Merging a version back into its master (parts updated, removed, added)
//! - Publishing, including republishing without further writes
//! - Retention of archived versions

#[cfg(test)]
mod publishing_tests {
    use anyhow::Result;
    use chrono::{Duration, TimeZone, Utc};
    use contentspace_core::behaviors::{ContentDefinition, DefinitionRegistry};
    use contentspace_core::config::VersioningConfig;
    use contentspace_core::db::{ContentStore, InMemoryStore};
    use contentspace_core::models::time::{FixedTimeProvider, TimeProvider};
    use contentspace_core::models::{
        ContentNode, ContentState, ContentTree, DetailValue, NodeKind,
    };
    use contentspace_core::services::{
        stamp_version_keys, ContentService, ContentServiceError, RequestContext, VersionManager,
        WorkflowStateChanger,
    };
    use std::sync::Arc;

    struct Fixture {
        store: Arc<InMemoryStore>,
        service: ContentService,
        versions: VersionManager,
        clock: Arc<FixedTimeProvider>,
        ctx: RequestContext,
    }

    fn create_fixture(max_versions_per_item: usize) -> Fixture {
        let store = Arc::new(InMemoryStore::new());
        let service = ContentService::new(store.clone());
        let clock = Arc::new(FixedTimeProvider::new(
            Utc.with_ymd_and_hms(2024, 5, 1, 8, 0, 0).unwrap(),
        ));

        let mut registry = DefinitionRegistry::new();
        registry.register(ContentDefinition::new("settings", NodeKind::Page).not_versionable());

        let versions = VersionManager::new(
            service.clone(),
            Arc::new(registry),
            Arc::new(WorkflowStateChanger),
            clock.clone(),
            VersioningConfig {
                max_versions_per_item,
            },
        );

        Fixture {
            store,
            service,
            versions,
            clock,
            ctx: RequestContext::new(),
        }
    }

    fn text(value: &str) -> DetailValue {
        DetailValue::String(value.to_string())
    }

    fn part(name: &str, body: &str) -> ContentTree {
        let mut node = ContentNode::part(name);
        node.set_detail("Text", text(body));
        ContentTree::new(node)
    }

    /// Published page "home" with parts teaser (holding image), text and a child page
    async fn create_home(fixture: &Fixture) -> Result<ContentTree> {
        let root = fixture
            .service
            .save(ContentNode::page("root"), &fixture.ctx)
            .await?;

        let mut home = ContentNode::page("home")
            .with_parent(root.id)
            .with_state(ContentState::Published);
        home.set_detail("Text", text("live"));

        let tree = ContentTree::new(home)
            .with_child(part("teaser", "teaser v1").with_child(part("image", "image v1")))
            .with_child(part("text", "text v1"))
            .with_child(ContentTree::new(ContentNode::page("news")));

        Ok(fixture.service.save_tree(tree, &fixture.ctx).await?)
    }

    fn forget_masters(parts: &mut [ContentTree]) {
        for part in parts {
            part.node.version_of = None;
            forget_masters(&mut part.children);
        }
    }

    fn names(tree: &ContentTree) -> Vec<String> {
        tree.iter().map(|t| t.node.name.clone()).collect()
    }

    fn child<'a>(tree: &'a ContentTree, name: &str) -> &'a ContentTree {
        tree.children
            .iter()
            .find(|c| c.node.name == name)
            .unwrap_or_else(|| panic!("missing child {}", name))
    }

    #[tokio::test]
    async fn test_add_version_archives_published_master() -> Result<()> {
        let fixture = create_fixture(0);
        let home = create_home(&fixture).await?;

        let version = fixture.versions.add_version(home.id(), &fixture.ctx).await?;

        assert!(!version.node.is_unsaved());
        assert_eq!(version.node.version_of, Some(home.id()));
        assert_eq!(version.node.parent_id, None);
        assert_eq!(version.node.state, ContentState::Unpublished);
        assert_eq!(names(&version), vec!["home", "teaser", "image", "text"]);
        assert_eq!(
            version.node.expires,
            Some(fixture.clock.now() - Duration::seconds(1))
        );

        // The live tree is untouched
        let live = fixture.service.get_tree(home.id()).await?.unwrap();
        assert_eq!(live, home);
        Ok(())
    }

    #[tokio::test]
    async fn test_versions_listed_newest_first() -> Result<()> {
        let fixture = create_fixture(0);
        let home = create_home(&fixture).await?;

        let first = fixture.versions.add_version(home.id(), &fixture.ctx).await?;
        let second = fixture.versions.add_version(home.id(), &fixture.ctx).await?;
        let draft = fixture.versions.create_draft(home.id(), &fixture.ctx).await?;

        let listed: Vec<u64> = fixture
            .versions
            .versions_of(home.id())
            .await?
            .iter()
            .map(|v| v.id)
            .collect();
        assert_eq!(listed, vec![draft.id(), second.id(), first.id()]);
        Ok(())
    }

    #[tokio::test]
    async fn test_not_versionable_type_is_rejected() -> Result<()> {
        let fixture = create_fixture(0);
        let settings = fixture
            .service
            .save(
                ContentNode::new("settings", NodeKind::Page, "settings"),
                &fixture.ctx,
            )
            .await?;

        let result = fixture.versions.add_version(settings.id, &fixture.ctx).await;

        assert!(matches!(
            result,
            Err(ContentServiceError::NotVersionable { .. })
        ));
        assert!(fixture.versions.versions_of(settings.id).await?.is_empty());
        Ok(())
    }

    #[tokio::test]
    async fn test_add_version_of_missing_node_fails() {
        let fixture = create_fixture(0);
        let result = fixture.versions.add_version(404, &fixture.ctx).await;
        assert!(matches!(
            result,
            Err(ContentServiceError::NodeNotFound { id: 404 })
        ));
    }

    #[tokio::test]
    async fn test_make_master_version_of_master_is_noop() -> Result<()> {
        let fixture = create_fixture(0);
        let home = create_home(&fixture).await?;
        let mut events = fixture.store.subscribe_to_events();

        let master = fixture
            .versions
            .make_master_version(&home, &fixture.ctx)
            .await?;

        assert_eq!(master, home.node);
        assert!(events.try_recv().is_err());
        Ok(())
    }

    #[tokio::test]
    async fn test_publish_draft_merges_parts() -> Result<()> {
        let fixture = create_fixture(0);
        let home = create_home(&fixture).await?;
        let teaser_id = child(&home, "teaser").id();
        let image_id = child(child(&home, "teaser"), "image").id();
        let text_id = child(&home, "text").id();
        let news_id = child(&home, "news").id();

        let mut draft = fixture.versions.create_draft(home.id(), &fixture.ctx).await?;
        assert_eq!(draft.node.state, ContentState::Draft);

        // Edit the teaser, drop the text part, add a footer
        draft.node.set_detail("Text", text("edited"));
        for part in draft.children.iter_mut() {
            if part.node.name == "teaser" {
                part.node.set_detail("Text", text("teaser v2"));
            }
        }
        draft.children.retain(|part| part.node.name != "text");
        draft.children.push(part("footer", "footer v1"));

        fixture.clock.advance(Duration::minutes(10));
        let published = fixture.versions.publish(&draft, &fixture.ctx).await?;

        assert_eq!(published.id, home.id());
        assert_eq!(published.parent_id, home.node.parent_id);
        assert_eq!(published.state, ContentState::Published);
        assert_eq!(published.detail("Text"), Some(&text("edited")));
        assert_eq!(published.version_of, None);

        let live = fixture.service.get_tree(home.id()).await?.unwrap();
        let teaser = child(&live, "teaser");
        assert_eq!(teaser.id(), teaser_id);
        assert_eq!(teaser.node.detail("Text"), Some(&text("teaser v2")));
        assert_eq!(child(teaser, "image").id(), image_id);
        assert!(fixture.service.get(text_id).await?.is_none());

        let footer = child(&live, "footer");
        assert_eq!(footer.node.detail("Text"), Some(&text("footer v1")));
        assert_eq!(footer.node.version_of, None);
        assert_eq!(footer.node.parent_id, Some(home.id()));

        // Child pages are never part of a merge
        assert_eq!(child(&live, "news").id(), news_id);

        // The merged draft is gone; the published master was archived
        assert!(fixture.service.get(draft.id()).await?.is_none());
        let versions = fixture.versions.versions_of(home.id()).await?;
        assert_eq!(versions.len(), 1);
        assert_eq!(versions[0].state, ContentState::Unpublished);
        assert_eq!(versions[0].detail("Text"), Some(&text("live")));
        Ok(())
    }

    #[tokio::test]
    async fn test_unpublished_master_is_not_archived() -> Result<()> {
        let fixture = create_fixture(0);
        let home = create_home(&fixture).await?;
        let mut master = home.node.clone();
        master.state = ContentState::Unpublished;
        fixture.service.save(master, &fixture.ctx).await?;

        let draft = fixture.versions.create_draft(home.id(), &fixture.ctx).await?;
        let merged = fixture
            .versions
            .make_master_version(&draft, &fixture.ctx)
            .await?;

        assert_eq!(merged.id, home.id());
        assert_eq!(merged.state, ContentState::Draft);
        assert!(fixture.versions.versions_of(home.id()).await?.is_empty());
        Ok(())
    }

    #[tokio::test]
    async fn test_unsaved_version_parts_match_by_version_key() -> Result<()> {
        let fixture = create_fixture(0);
        let home = create_home(&fixture).await?;
        let teaser_id = child(&home, "teaser").id();

        let mut live = fixture.service.get_tree(home.id()).await?.unwrap();
        stamp_version_keys(&mut live);
        for node in live.iter() {
            fixture.service.save(node.node.clone(), &fixture.ctx).await?;
        }

        // Detached editing copy that never went through the store
        let mut edited = fixture
            .versions
            .cloner()
            .clone_for_versioning(&live, None, false)?;
        forget_masters(&mut edited.children);
        edited.children[0].node.set_detail("Text", text("keyed"));

        fixture
            .versions
            .replace_version(home.id(), &edited, false, &fixture.ctx)
            .await?;

        let merged = fixture.service.get_tree(home.id()).await?.unwrap();
        let teaser = child(&merged, "teaser");
        assert_eq!(teaser.id(), teaser_id);
        assert_eq!(teaser.node.detail("Text"), Some(&text("keyed")));
        Ok(())
    }

    #[tokio::test]
    async fn test_replace_with_missing_master_fails() -> Result<()> {
        let fixture = create_fixture(0);
        let home = create_home(&fixture).await?;
        let draft = fixture.versions.create_draft(home.id(), &fixture.ctx).await?;

        fixture.service.delete(home.id()).await?;
        let result = fixture.versions.publish(&draft, &fixture.ctx).await;

        match result {
            Err(ContentServiceError::MasterNotFound {
                master_id,
                version_id,
            }) => {
                assert_eq!(master_id, home.id());
                assert_eq!(version_id, draft.id());
            }
            other => panic!("expected MasterNotFound, got {:?}", other),
        }
        Ok(())
    }

    #[tokio::test]
    async fn test_republishing_is_idempotent() -> Result<()> {
        let fixture = create_fixture(0);
        let root = fixture
            .service
            .save(ContentNode::page("root"), &fixture.ctx)
            .await?;
        let page = fixture
            .service
            .save(ContentNode::page("page").with_parent(root.id), &fixture.ctx)
            .await?;

        let first = fixture
            .versions
            .publish(&ContentTree::new(page), &fixture.ctx)
            .await?;
        assert_eq!(first.state, ContentState::Published);
        assert_eq!(first.published, Some(fixture.clock.now()));

        let mut events = fixture.store.subscribe_to_events();
        fixture.clock.advance(Duration::hours(1));
        let second = fixture
            .versions
            .publish(&ContentTree::new(first.clone()), &fixture.ctx)
            .await?;

        assert_eq!(second, first);
        assert!(events.try_recv().is_err());
        assert_eq!(fixture.service.require(first.id).await?, first);
        Ok(())
    }

    #[tokio::test]
    async fn test_first_publication_time_is_kept() -> Result<()> {
        let fixture = create_fixture(0);
        let home = create_home(&fixture).await?;
        let first_published = Utc.with_ymd_and_hms(2020, 1, 1, 0, 0, 0).unwrap();
        let mut master = home.node.clone();
        master.published = Some(first_published);
        master.state = ContentState::Unpublished;
        let master = fixture.service.save(master, &fixture.ctx).await?;

        let published = fixture
            .versions
            .publish(&ContentTree::new(master), &fixture.ctx)
            .await?;

        assert_eq!(published.published, Some(first_published));
        Ok(())
    }

    #[tokio::test]
    async fn test_old_versions_are_trimmed_but_drafts_kept() -> Result<()> {
        let fixture = create_fixture(2);
        let home = create_home(&fixture).await?;

        let draft = fixture.versions.create_draft(home.id(), &fixture.ctx).await?;
        let first = fixture.versions.add_version(home.id(), &fixture.ctx).await?;
        let second = fixture.versions.add_version(home.id(), &fixture.ctx).await?;
        let third = fixture.versions.add_version(home.id(), &fixture.ctx).await?;

        let kept: Vec<u64> = fixture
            .versions
            .versions_of(home.id())
            .await?
            .iter()
            .map(|v| v.id)
            .collect();
        assert_eq!(kept, vec![third.id(), second.id(), draft.id()]);

        // Trimming removes whole version trees
        let first_part = first.children[0].id();
        assert!(fixture.store.get(first.id()).await?.is_none());
        assert!(fixture.store.get(first_part).await?.is_none());
        Ok(())
    }
}
