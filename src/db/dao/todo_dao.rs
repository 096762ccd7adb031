use std::collections::HashSet;

use sea_orm::{
    ColumnTrait, ConnectionTrait, DatabaseConnection, QueryFilter, Set, TransactionTrait,
};
use uuid::Uuid;

use super::{DaoBase, DaoLayerError, DaoResult};
use crate::db::entities::todo::{self, ChildIds};

const ENTITY: &str = "Todo";
const DEFAULT_BACKGROUND: &str = "white";

/// Mutable non-structural fields. `parent_id` and `children` are absent on
/// purpose; they only move through `reparent_todo`.
#[derive(Debug, Default, Clone)]
pub struct TodoPatch {
    pub text: Option<String>,
    pub status: Option<bool>,
    pub background_color: Option<String>,
}

#[derive(Clone)]
pub struct TodoDao {
    db: DatabaseConnection,
}

impl DaoBase for TodoDao {
    type Entity = crate::db::entities::prelude::Todo;

    fn from_db(db: DatabaseConnection) -> Self {
        Self { db }
    }

    fn db(&self) -> &DatabaseConnection {
        &self.db
    }
}

impl TodoDao {
    async fn find_scoped<C: ConnectionTrait + Send + Sync>(
        &self,
        conn: &C,
        owner_id: Uuid,
        id: Uuid,
    ) -> DaoResult<Option<todo::Model>> {
        self.find_one_in(conn, |query| {
            query
                .filter(todo::Column::Id.eq(id))
                .filter(todo::Column::OwnerId.eq(owner_id))
        })
        .await
    }

    async fn require_scoped<C: ConnectionTrait + Send + Sync>(
        &self,
        conn: &C,
        owner_id: Uuid,
        id: Uuid,
    ) -> DaoResult<todo::Model> {
        self.find_scoped(conn, owner_id, id)
            .await?
            .ok_or(DaoLayerError::NotFound { entity: ENTITY, id })
    }

    async fn save_children<C: ConnectionTrait + Send + Sync>(
        &self,
        conn: &C,
        model: todo::Model,
        children: ChildIds,
    ) -> DaoResult<todo::Model> {
        self.update_model_in(conn, model, |active| {
            active.children = Set(children);
        })
        .await
    }

    /// Walk the ancestor chain of `parent`; reaching `id` means the candidate
    /// parent sits inside the subtree of `id` and linking would close a cycle.
    async fn ensure_not_descendant<C: ConnectionTrait + Send + Sync>(
        &self,
        conn: &C,
        owner_id: Uuid,
        id: Uuid,
        parent: &todo::Model,
    ) -> DaoResult<()> {
        let mut seen = HashSet::new();
        let mut cursor = parent.parent_id;
        while let Some(ancestor_id) = cursor {
            if ancestor_id == id {
                return Err(DaoLayerError::InvalidParent {
                    id,
                    parent_id: parent.id,
                    reason: "the new parent is a descendant of the todo",
                });
            }
            if !seen.insert(ancestor_id) {
                // ancestor loop in stored data; nothing further to prove
                break;
            }
            cursor = match self.find_scoped(conn, owner_id, ancestor_id).await? {
                Some(ancestor) => ancestor.parent_id,
                None => None,
            };
        }
        Ok(())
    }

    pub async fn create_todo(
        &self,
        owner_id: Uuid,
        text: &str,
        parent_id: Option<Uuid>,
    ) -> DaoResult<todo::Model> {
        let txn = self.db.begin().await.map_err(DaoLayerError::Db)?;

        let parent = match parent_id {
            Some(pid) => Some(self.require_scoped(&txn, owner_id, pid).await?),
            None => None,
        };

        let model = todo::ActiveModel {
            owner_id: Set(owner_id),
            text: Set(text.to_string()),
            status: Set(false),
            parent_id: Set(parent_id),
            children: Set(ChildIds::default()),
            collapsed: Set(false),
            background_color: Set(DEFAULT_BACKGROUND.to_string()),
            ..Default::default()
        };
        let created = self.create_in(&txn, model).await?;

        if let Some(parent) = parent {
            let mut children = parent.children.clone();
            children.push_unique(created.id);
            self.save_children(&txn, parent, children).await?;
        }

        txn.commit().await.map_err(DaoLayerError::Db)?;
        Ok(created)
    }

    pub async fn find_todo(&self, owner_id: Uuid, id: Uuid) -> DaoResult<todo::Model> {
        self.require_scoped(self.db(), owner_id, id).await
    }

    pub async fn list_todos(&self, owner_id: Uuid) -> DaoResult<Vec<todo::Model>> {
        self.find_all(|query| query.filter(todo::Column::OwnerId.eq(owner_id)))
            .await
    }

    pub async fn update_todo(
        &self,
        owner_id: Uuid,
        id: Uuid,
        patch: TodoPatch,
    ) -> DaoResult<todo::Model> {
        let model = self.require_scoped(self.db(), owner_id, id).await?;

        self.update_model_in(self.db(), model, |active| {
            if let Some(text) = patch.text {
                active.text = Set(text);
            }
            if let Some(status) = patch.status {
                active.status = Set(status);
            }
            if let Some(background_color) = patch.background_color {
                active.background_color = Set(background_color);
            }
        })
        .await
    }

    /// Move a todo under a new parent, or to the root with `None`. Unlink,
    /// link and the `parent_id` write share one transaction so a reader never
    /// sees the id in two children lists or in none.
    pub async fn reparent_todo(
        &self,
        owner_id: Uuid,
        id: Uuid,
        new_parent_id: Option<Uuid>,
    ) -> DaoResult<()> {
        if new_parent_id == Some(id) {
            return Err(DaoLayerError::InvalidParent {
                id,
                parent_id: id,
                reason: "a todo cannot be its own parent",
            });
        }

        let txn = self.db.begin().await.map_err(DaoLayerError::Db)?;

        let node = self.require_scoped(&txn, owner_id, id).await?;
        let new_parent = match new_parent_id {
            Some(pid) => {
                let parent = self.require_scoped(&txn, owner_id, pid).await?;
                self.ensure_not_descendant(&txn, owner_id, id, &parent)
                    .await?;
                Some(parent)
            }
            None => None,
        };

        if let Some(old_pid) = node.parent_id {
            if let Some(old_parent) = self.find_scoped(&txn, owner_id, old_pid).await? {
                let mut children = old_parent.children.clone();
                children.remove(&id);
                self.save_children(&txn, old_parent, children).await?;
            }
        }

        if let Some(parent) = new_parent {
            let mut children = parent.children.clone();
            children.push_unique(id);
            self.save_children(&txn, parent, children).await?;
        }

        self.update_model_in(&txn, node, |active| {
            active.parent_id = Set(new_parent_id);
        })
        .await?;

        txn.commit().await.map_err(DaoLayerError::Db)?;
        Ok(())
    }

    /// Set the collapsed flag, optionally on the whole subtree. Parents are
    /// written before their children; ids without a record are skipped.
    pub async fn set_collapsed(
        &self,
        owner_id: Uuid,
        id: Uuid,
        collapsed: bool,
        recursive: bool,
    ) -> DaoResult<()> {
        let txn = self.db.begin().await.map_err(DaoLayerError::Db)?;

        let node = self.require_scoped(&txn, owner_id, id).await?;
        let mut queue = vec![node];
        let mut seen = HashSet::new();
        while let Some(current) = queue.pop() {
            if !seen.insert(current.id) {
                continue;
            }
            if recursive {
                for child_id in current.children.iter() {
                    if let Some(child) = self.find_scoped(&txn, owner_id, *child_id).await? {
                        queue.push(child);
                    }
                }
            }
            self.update_model_in(&txn, current, |active| {
                active.collapsed = Set(collapsed);
            })
            .await?;
        }

        txn.commit().await.map_err(DaoLayerError::Db)?;
        Ok(())
    }

    /// Cascade delete: unlink from the parent, then remove the whole subtree,
    /// children before parents. Returns the number of records removed.
    pub async fn delete_todo(&self, owner_id: Uuid, id: Uuid) -> DaoResult<u64> {
        let txn = self.db.begin().await.map_err(DaoLayerError::Db)?;

        let node = self.require_scoped(&txn, owner_id, id).await?;

        if let Some(parent_id) = node.parent_id {
            if let Some(parent) = self.find_scoped(&txn, owner_id, parent_id).await? {
                let mut children = parent.children.clone();
                children.remove(&id);
                self.save_children(&txn, parent, children).await?;
            }
        }

        // Parent-first sweep of the subtree; the delete loop below runs it
        // in reverse so children go before their parents.
        let mut ordered = Vec::new();
        let mut queue = vec![node];
        let mut seen = HashSet::new();
        while let Some(current) = queue.pop() {
            if !seen.insert(current.id) {
                continue;
            }
            for child_id in current.children.iter() {
                if let Some(child) = self.find_scoped(&txn, owner_id, *child_id).await? {
                    queue.push(child);
                }
            }
            ordered.push(current.id);
        }

        let mut deleted = 0;
        for target in ordered.iter().rev() {
            deleted += self.delete_in(&txn, *target).await?;
        }

        txn.commit().await.map_err(DaoLayerError::Db)?;
        Ok(deleted)
    }
}
