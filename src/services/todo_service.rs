use uuid::Uuid;

use crate::{
    db::dao::{TodoDao, TodoPatch},
    db::entities::todo,
    error::AppError,
    tree,
};

/// Operations on one owner's todo forest. Structural consistency lives in the
/// dao's transactions; this boundary validates input and maps storage errors
/// onto HTTP semantics.
#[derive(Clone)]
pub struct TodoService {
    todo_dao: TodoDao,
}

impl TodoService {
    pub fn new(todo_dao: TodoDao) -> Self {
        Self { todo_dao }
    }

    pub async fn create_todo(
        &self,
        owner_id: Uuid,
        text: &str,
        parent_id: Option<Uuid>,
    ) -> Result<todo::Model, AppError> {
        Ok(self.todo_dao.create_todo(owner_id, text, parent_id).await?)
    }

    pub async fn get_todo(&self, owner_id: Uuid, id: Uuid) -> Result<todo::Model, AppError> {
        Ok(self.todo_dao.find_todo(owner_id, id).await?)
    }

    /// All of the owner's todos in parent-first rendering order.
    pub async fn list_todos(&self, owner_id: Uuid) -> Result<Vec<todo::Model>, AppError> {
        let todos = self.todo_dao.list_todos(owner_id).await?;
        Ok(tree::assemble(todos))
    }

    pub async fn update_todo(
        &self,
        owner_id: Uuid,
        id: Uuid,
        patch: TodoPatch,
    ) -> Result<todo::Model, AppError> {
        Ok(self.todo_dao.update_todo(owner_id, id, patch).await?)
    }

    pub async fn reparent_todo(
        &self,
        owner_id: Uuid,
        id: Uuid,
        new_parent_id: Option<Uuid>,
    ) -> Result<(), AppError> {
        Ok(self
            .todo_dao
            .reparent_todo(owner_id, id, new_parent_id)
            .await?)
    }

    pub async fn set_collapsed(
        &self,
        owner_id: Uuid,
        id: Uuid,
        collapsed: bool,
        recursive: bool,
    ) -> Result<(), AppError> {
        Ok(self
            .todo_dao
            .set_collapsed(owner_id, id, collapsed, recursive)
            .await?)
    }

    pub async fn delete_todo(&self, owner_id: Uuid, id: Uuid) -> Result<u64, AppError> {
        Ok(self.todo_dao.delete_todo(owner_id, id).await?)
    }
}

#[cfg(test)]
mod tests {
    use chrono::{FixedOffset, TimeZone};
    use sea_orm::{DatabaseBackend, MockDatabase};
    use uuid::Uuid;

    use super::TodoService;
    use crate::db::dao::{DaoBase, TodoDao};
    use crate::db::entities::todo::{self, ChildIds};
    use crate::error::AppError;

    fn ts() -> chrono::DateTime<chrono::FixedOffset> {
        FixedOffset::east_opt(0)
            .expect("offset should be valid")
            .with_ymd_and_hms(2026, 1, 1, 0, 0, 0)
            .single()
            .expect("timestamp should be valid")
    }

    fn model(
        id: Uuid,
        owner_id: Uuid,
        parent_id: Option<Uuid>,
        children: Vec<Uuid>,
    ) -> todo::Model {
        let now = ts();
        todo::Model {
            id,
            owner_id,
            text: "todo".to_string(),
            status: false,
            parent_id,
            children: ChildIds(children),
            collapsed: false,
            background_color: "white".to_string(),
            created_at: now,
            updated_at: now,
        }
    }

    fn service(db: sea_orm::DatabaseConnection) -> TodoService {
        TodoService::new(TodoDao::new(&db))
    }

    #[tokio::test]
    async fn get_todo_maps_missing_record_to_not_found() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([Vec::<todo::Model>::new()])
            .into_connection();

        let err = service(db)
            .get_todo(Uuid::new_v4(), Uuid::new_v4())
            .await
            .expect_err("get should fail");
        assert!(matches!(err, AppError::NotFound(_)));
    }

    #[tokio::test]
    async fn reparent_todo_maps_self_parent_to_bad_request() {
        let db = MockDatabase::new(DatabaseBackend::Postgres).into_connection();
        let id = Uuid::new_v4();

        let err = service(db)
            .reparent_todo(Uuid::new_v4(), id, Some(id))
            .await
            .expect_err("reparent should fail");
        assert!(matches!(err, AppError::BadRequest(_)));
    }

    #[tokio::test]
    async fn list_todos_returns_parent_first_order() {
        let owner_id = Uuid::new_v4();
        let (a, b, c) = (Uuid::new_v4(), Uuid::new_v4(), Uuid::new_v4());
        // The scan comes back in storage order; assembly must fix it up.
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([vec![
                model(b, owner_id, Some(a), vec![c]),
                model(c, owner_id, Some(b), vec![]),
                model(a, owner_id, None, vec![b]),
            ]])
            .into_connection();

        let listed = service(db)
            .list_todos(owner_id)
            .await
            .expect("list should succeed");
        let ids: Vec<Uuid> = listed.iter().map(|t| t.id).collect();
        assert_eq!(ids, vec![a, b, c]);
    }
}
