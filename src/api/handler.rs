//! API Handler for tabledb
//!
//! Owns the catalog and runs one request at a time. Mutating table
//! operations persist the active database when autosave is enabled.

use serde_json::{json, Value};

use crate::catalog::Catalog;
use crate::observability::{Event, Logger};

use super::errors::ApiResult;
use super::request::Request;
use super::response::Response;

pub struct ApiHandler {
    catalog: Catalog,
}

impl ApiHandler {
    pub fn new(catalog: Catalog) -> Self {
        Self { catalog }
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    pub fn into_catalog(self) -> Catalog {
        self.catalog
    }

    /// Handle a raw JSON request string
    pub fn handle(&mut self, json_request: &str) -> Response {
        match Request::parse(json_request) {
            Ok(request) => self.handle_request(request),
            Err(e) => {
                Logger::event(Event::RequestRejected, &[("code", e.code()), ("op", "?")]);
                Response::error(&e)
            }
        }
    }

    /// Handle an already parsed request
    pub fn handle_request(&mut self, request: Request) -> Response {
        let op = request.op();
        let mutates = request.mutates_tables();

        let result = self.dispatch(request);
        if mutates && result.is_ok() {
            self.autosave();
        }

        match result {
            Ok(data) => {
                Logger::event(Event::RequestHandled, &[("op", op)]);
                Response::success(data)
            }
            Err(e) => {
                Logger::event(Event::RequestRejected, &[("code", e.code()), ("op", op)]);
                Response::error(&e)
            }
        }
    }

    fn dispatch(&mut self, request: Request) -> ApiResult<Value> {
        match request {
            Request::CreateTable { name, schema } => {
                let table = self.catalog.active_mut()?.create_table(&name, schema)?;
                let data = table.to_json();
                Logger::event(Event::TableCreated, &[("table", name.as_str())]);
                Ok(data)
            }
            Request::DropTable { name } => {
                self.catalog.active_mut()?.drop_table(&name)?;
                Logger::event(Event::TableDropped, &[("table", name.as_str())]);
                Ok(json!({"dropped": name}))
            }
            Request::ListTables => {
                let db = self.catalog.active()?;
                Ok(json!({"database": db.name(), "tables": db.summaries()}))
            }
            Request::ViewTable { name } => Ok(self.catalog.active()?.get_table(&name)?.to_json()),
            Request::InsertRow { table, values } => {
                let db = self.catalog.active_mut()?;
                let row = db.insert_row(&table, &values)?.to_json();
                let row_index = db.get_table(&table)?.row_count() - 1;
                Ok(json!({"table": table, "row_index": row_index, "row": row}))
            }
            Request::UpdateRow {
                table,
                row_index,
                values,
            } => {
                let row = self
                    .catalog
                    .active_mut()?
                    .edit_row(&table, row_index, &values)?
                    .to_json();
                Ok(json!({"table": table, "row_index": row_index, "row": row}))
            }
            Request::DeleteRow { table, row_index } => {
                let row = self.catalog.active_mut()?.delete_row(&table, row_index)?;
                Ok(json!({"table": table, "row_index": row_index, "row": row.to_json()}))
            }
            Request::Union { left, right, name } => {
                let max_len = self.catalog.config().max_table_name_len;
                let table = self.catalog.active_mut()?.union_with_limit(
                    &left,
                    &right,
                    name.as_deref(),
                    max_len,
                )?;
                let data = table.to_json();
                Logger::event(
                    Event::UnionCompleted,
                    &[
                        ("left", left.as_str()),
                        ("right", right.as_str()),
                        ("table", table.name()),
                    ],
                );
                Ok(data)
            }
            Request::ListDatabases => {
                let listing = self.catalog.list();
                Ok(json!({"active": listing.active, "databases": listing.databases}))
            }
            Request::CreateDatabase { name } => {
                self.catalog.create_database(&name)?;
                Ok(json!({"database": name, "active": self.catalog.active_name()}))
            }
            Request::SwitchDatabase { name } => {
                let db = self.catalog.switch_database(&name)?;
                Ok(json!({"active": db.name(), "tables": db.table_names().collect::<Vec<_>>()}))
            }
            Request::DeleteDatabase { name } => {
                self.catalog.delete_database(&name)?;
                Ok(json!({"deleted": name, "active": self.catalog.active_name()}))
            }
            Request::RenameDatabase { old, new } => {
                let old = old.unwrap_or_else(|| self.catalog.active_name().to_string());
                self.catalog.rename_database(&old, &new)?;
                Ok(json!({"from": old, "to": new, "active": self.catalog.active_name()}))
            }
            Request::Save { name, path } => {
                let name = name.unwrap_or_else(|| self.catalog.active_name().to_string());
                let path = match path {
                    Some(path) => {
                        self.catalog.save_database_to(&name, &path)?;
                        path
                    }
                    None => self.catalog.save_database(&name)?,
                };
                Ok(json!({"database": name, "path": path.display().to_string()}))
            }
            Request::Load { name, path } => {
                let path = path.unwrap_or_else(|| self.catalog.path_for(&name));
                let db = self.catalog.load_database_from(&name, &path)?;
                Ok(json!({"active": db.name(), "tables": db.table_names().collect::<Vec<_>>()}))
            }
            Request::Export { name } => {
                let name = name.unwrap_or_else(|| self.catalog.active_name().to_string());
                Ok(self.catalog.export(&name)?)
            }
            Request::ImportDatabase { name, data } => {
                let final_name = self.catalog.import_database(&name, &data)?;
                Ok(json!({"database": final_name, "active": self.catalog.active_name()}))
            }
        }
    }

    /// Persists the active database after a table change.
    ///
    /// The change is already applied in memory, so a failed write is logged
    /// and the request still succeeds. The next successful save catches up.
    fn autosave(&self) {
        if !self.catalog.config().autosave {
            return;
        }
        let name = self.catalog.active_name();
        if let Err(e) = self.catalog.save_database(name) {
            Logger::event(
                Event::AutosaveFailed,
                &[("code", e.code()), ("database", name), ("error", &e.to_string())],
            );
        }
    }
}
