#[derive(Debug, Clone)]
pub struct Technician {
    pub id: i64,
    pub name: String,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub commission_rate: f64,
    pub status: String,
}

#[derive(Debug, Clone)]
pub struct PipelineStage {
    pub id: i64,
    pub name: String,
    pub color: String,
    pub order_position: i64,
}

#[derive(Debug, Clone)]
pub struct FormField {
    pub id: i64,
    pub name: String,
    pub label: String,
    pub field_type: String,
    pub required: bool,
    pub options: Vec<String>,
    pub order_position: i64,
}

#[derive(Debug, Clone)]
pub struct Role {
    pub id: i64,
    pub name: String,
    pub description: String,
    pub permissions: Vec<String>,
    pub is_system: bool,
}

#[derive(Debug, Clone)]
pub struct User {
    pub id: i64,
    pub name: String,
    pub email: String,
    pub role: String,
    pub status: String,
}

#[allow(dead_code)]
#[derive(Debug, Clone)]
pub struct Message {
    pub id: i64,
    pub sender_name: String,
    pub sender_type: String,
    pub recipient_name: String,
    pub content: String,
    pub message_type: String,
    pub is_read: bool,
    pub created_at: String,
}

#[allow(dead_code)]
#[derive(Debug, Clone)]
pub struct Supply {
    pub id: i64,
    pub name: String,
    pub category: String,
    pub part_number: Option<String>,
    pub tech_price: f64,
    pub purchase_price: f64,
    pub markup_percentage: f64,
    pub stock_quantity: i64,
    pub min_stock_level: i64,
    pub supplier: Option<String>,
    pub notes: Option<String>,
    pub is_active: bool,
}

#[allow(dead_code)]
#[derive(Debug, Clone)]
pub struct ImportRecord {
    pub id: Option<i64>,
    pub filename: String,
    pub record_count: Option<i64>,
    pub date_range_start: Option<String>,
    pub date_range_end: Option<String>,
    pub checksum: Option<String>,
}
