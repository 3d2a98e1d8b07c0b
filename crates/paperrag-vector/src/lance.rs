use arrow_array::cast::AsArray;
use arrow_array::types::{Float32Type, Float64Type, Int32Type, Int64Type, UInt32Type, UInt64Type};
use arrow_array::{Array, RecordBatch};
use arrow_schema::DataType;
use async_trait::async_trait;
use futures::TryStreamExt;
use lancedb::query::{ExecutableQuery, QueryBase};
use lancedb::{DistanceType, Table};
use serde_json::{Number, Value};
use std::marker::PhantomData;

use paperrag_core::config::IndexSettings;
use paperrag_core::error::{Error, Result};
use paperrag_core::traits::EmbeddingIndex;
use paperrag_core::types::{IndexMatch, Metadata, QueryVector, VectorSpace};

use crate::table::open_db;

const ID_COLUMN: &str = "id";
const VECTOR_COLUMN: &str = "vector";
const DISTANCE_COLUMN: &str = "_distance";

/// A LanceDB table used as an offline vector index.
///
/// Search uses cosine distance, reported as `score = 1 - _distance`. Every
/// scalar column besides `id` and `vector` is returned as metadata.
pub struct LanceIndex<S> { table: Table, name: String, _space: PhantomData<S> }

impl<S: VectorSpace> LanceIndex<S> {
	pub async fn open(settings: &IndexSettings) -> Result<Self> {
		let path = settings
			.lance_path()
			.ok_or_else(|| Error::InvalidConfig(format!("uri missing for lance index '{}'", settings.name)))?;
		let db = open_db(&path.to_string_lossy()).await?;
		let table = db.open_table(&settings.name).execute().await.map_err(Error::backend)?;
		tracing::info!(index = %settings.name, path = %path.display(), modality = %S::MODALITY, "opened lance index");
		Ok(Self { table, name: settings.name.clone(), _space: PhantomData })
	}
}

#[async_trait]
impl<S: VectorSpace> EmbeddingIndex<S> for LanceIndex<S> {
	fn name(&self) -> &str { &self.name }

	async fn query(&self, vector: &QueryVector<S>, top_k: usize) -> Result<Vec<IndexMatch>> {
		if top_k == 0 { return Err(Error::InvalidQuery("top_k must be a positive integer".to_string())); }
		let mut stream = self.table
			.vector_search(vector.values().to_vec()).map_err(Error::backend)?
			.distance_type(DistanceType::Cosine)
			.limit(top_k)
			.execute().await.map_err(Error::backend)?;
		let mut hits = Vec::new();
		while let Some(batch) = stream.try_next().await.map_err(Error::backend)? {
			hits.extend(batch_to_matches(&batch)?);
		}
		tracing::debug!(index = %self.name, top_k, hits = hits.len(), "lance query done");
		Ok(hits)
	}
}

/// Convert one result batch into index matches, row by row.
pub fn batch_to_matches(batch: &RecordBatch) -> Result<Vec<IndexMatch>> {
	let ids = batch
		.column_by_name(ID_COLUMN)
		.and_then(|c| c.as_string_opt::<i32>())
		.ok_or_else(|| Error::backend("lance result has no utf8 'id' column"))?;
	let distances = batch.column_by_name(DISTANCE_COLUMN).and_then(|c| c.as_primitive_opt::<Float32Type>());
	let schema = batch.schema();
	let mut out = Vec::with_capacity(batch.num_rows());
	for row in 0..batch.num_rows() {
		let score = distances.filter(|d| d.is_valid(row)).map(|d| 1.0 - d.value(row));
		let mut metadata = Metadata::new();
		for (field, column) in schema.fields().iter().zip(batch.columns()) {
			let name = field.name().as_str();
			if name == ID_COLUMN || name == VECTOR_COLUMN || name == DISTANCE_COLUMN { continue; }
			if let Some(value) = cell_value(column.as_ref(), field.data_type(), row) { metadata.insert(name.to_string(), value); }
		}
		out.push(IndexMatch { id: ids.value(row).to_string(), score, metadata });
	}
	Ok(out)
}

fn cell_value(column: &dyn Array, data_type: &DataType, row: usize) -> Option<Value> {
	if column.is_null(row) { return None; }
	match data_type {
		DataType::Utf8 => column.as_string_opt::<i32>().map(|a| Value::from(a.value(row))),
		DataType::LargeUtf8 => column.as_string_opt::<i64>().map(|a| Value::from(a.value(row))),
		DataType::Int32 => column.as_primitive_opt::<Int32Type>().map(|a| Value::from(a.value(row))),
		DataType::Int64 => column.as_primitive_opt::<Int64Type>().map(|a| Value::from(a.value(row))),
		DataType::UInt32 => column.as_primitive_opt::<UInt32Type>().map(|a| Value::from(a.value(row))),
		DataType::UInt64 => column.as_primitive_opt::<UInt64Type>().map(|a| Value::from(a.value(row))),
		DataType::Float32 => column.as_primitive_opt::<Float32Type>().and_then(|a| Number::from_f64(f64::from(a.value(row)))).map(Value::Number),
		DataType::Float64 => column.as_primitive_opt::<Float64Type>().and_then(|a| Number::from_f64(a.value(row))).map(Value::Number),
		DataType::Boolean => column.as_boolean_opt().map(|a| Value::from(a.value(row))),
		_ => None,
	}
}
