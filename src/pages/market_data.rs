use crate::crud::draft::{choices_of, fmt_number, insert_opt, opt_text, optional_number};
use crate::crud::{CrudPage, Draft, Endpoint, FieldSpec, Messages};
use crate::model::market_data::default_currency;
use crate::model::{MarketAssetType, MarketData};
use crate::session::PATH_MARKET_DATA;
use serde_json::{json, Map, Value};

pub type MarketDataPage = CrudPage<MarketDataDraft>;

pub fn market_data_page() -> MarketDataPage {
    CrudPage::new(
        "市场数据",
        "市场数据",
        Endpoint::new(PATH_MARKET_DATA),
        Messages {
            load_failed: "加载失败",
            create_failed: "新增失败",
            update_failed: "编辑失败",
            delete_failed: "删除失败",
        },
    )
}

const FIELDS: &[FieldSpec] = &[
    FieldSpec::text("证券代码", true),
    FieldSpec::text("证券名称", true),
    FieldSpec::choice("资产类型", choices_of::<MarketAssetType>),
    FieldSpec::text("交易所", true),
    FieldSpec::text("货币", true),
    FieldSpec::toggle("是否活跃"),
    FieldSpec::text("行业", false),
    FieldSpec::text("板块", false),
    FieldSpec::number("市值", false),
    FieldSpec::number("市盈率", false),
    FieldSpec::number("市净率", false),
    FieldSpec::number("股息率", false),
];

#[derive(Debug, Clone, PartialEq)]
pub struct MarketDataDraft {
    pub symbol: String,
    pub name: String,
    pub asset_type: String,
    pub exchange: String,
    pub currency: String,
    pub is_active: bool,
    pub industry: String,
    pub sector: String,
    pub market_cap: String,
    pub pe_ratio: String,
    pub pb_ratio: String,
    pub dividend_yield: String,
}

impl Default for MarketDataDraft {
    fn default() -> Self {
        Self {
            symbol: String::new(),
            name: String::new(),
            asset_type: "STOCK".to_string(),
            exchange: String::new(),
            currency: default_currency(),
            is_active: true,
            industry: String::new(),
            sector: String::new(),
            market_cap: String::new(),
            pe_ratio: String::new(),
            pb_ratio: String::new(),
            dividend_yield: String::new(),
        }
    }
}

impl Draft for MarketDataDraft {
    type Record = MarketData;

    fn from_record(r: &MarketData) -> Self {
        Self {
            symbol: r.symbol.clone(),
            name: r.name.clone(),
            asset_type: r.asset_type.clone(),
            exchange: r.exchange.clone(),
            currency: r.currency.clone(),
            is_active: r.is_active,
            industry: r.industry.clone().unwrap_or_default(),
            sector: r.sector.clone().unwrap_or_default(),
            market_cap: fmt_number(r.market_cap),
            pe_ratio: fmt_number(r.pe_ratio),
            pb_ratio: fmt_number(r.pb_ratio),
            dividend_yield: fmt_number(r.dividend_yield),
        }
    }

    fn fields() -> &'static [FieldSpec] {
        FIELDS
    }

    fn value(&self, idx: usize) -> String {
        match idx {
            0 => self.symbol.clone(),
            1 => self.name.clone(),
            2 => self.asset_type.clone(),
            3 => self.exchange.clone(),
            4 => self.currency.clone(),
            5 => self.is_active.to_string(),
            6 => self.industry.clone(),
            7 => self.sector.clone(),
            8 => self.market_cap.clone(),
            9 => self.pe_ratio.clone(),
            10 => self.pb_ratio.clone(),
            11 => self.dividend_yield.clone(),
            _ => String::new(),
        }
    }

    fn set_value(&mut self, idx: usize, value: String) {
        match idx {
            0 => self.symbol = value,
            1 => self.name = value,
            2 => self.asset_type = value,
            3 => self.exchange = value,
            4 => self.currency = value,
            5 => self.is_active = value == "true",
            6 => self.industry = value,
            7 => self.sector = value,
            8 => self.market_cap = value,
            9 => self.pe_ratio = value,
            10 => self.pb_ratio = value,
            11 => self.dividend_yield = value,
            _ => {}
        }
    }

    /// 空的可选字段不发送，数值字段转成数字
    fn to_payload(&self) -> Result<Value, String> {
        let mut obj = Map::new();
        for (key, raw) in [
            ("symbol", &self.symbol),
            ("name", &self.name),
            ("asset_type", &self.asset_type),
            ("exchange", &self.exchange),
            ("currency", &self.currency),
        ] {
            obj.insert(key.into(), Value::String(raw.trim().to_string()));
        }
        obj.insert("is_active".into(), Value::Bool(self.is_active));
        insert_opt(&mut obj, "industry", opt_text(&self.industry));
        insert_opt(&mut obj, "sector", opt_text(&self.sector));
        for (idx, key, raw) in [
            (8, "market_cap", &self.market_cap),
            (9, "pe_ratio", &self.pe_ratio),
            (10, "pb_ratio", &self.pb_ratio),
            (11, "dividend_yield", &self.dividend_yield),
        ] {
            let v = optional_number(FIELDS[idx].label, raw)?;
            insert_opt(&mut obj, key, v.map(|x| json!(x)));
        }
        Ok(Value::Object(obj))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pages::{Op, Page};
    use crate::session::ApiError;
    use crossterm::event::KeyCode;

    #[test]
    fn defaults_for_new_record() {
        let draft = MarketDataDraft {
            symbol: "600519".into(),
            name: "贵州茅台".into(),
            exchange: "SSE".into(),
            pe_ratio: "28.5".into(),
            ..MarketDataDraft::default()
        };
        assert!(draft.validate().is_ok());
        assert_eq!(
            draft.to_payload().unwrap(),
            json!({
                "symbol": "600519", "name": "贵州茅台", "asset_type": "STOCK",
                "exchange": "SSE", "currency": "CNY", "is_active": true,
                "pe_ratio": 28.5
            })
        );
    }

    #[test]
    fn bad_number_is_rejected() {
        let draft = MarketDataDraft {
            symbol: "X".into(),
            name: "X".into(),
            exchange: "X".into(),
            market_cap: "很多".into(),
            ..MarketDataDraft::default()
        };
        assert_eq!(draft.to_payload().unwrap_err(), "市值必须为数字");
    }

    #[test]
    fn asset_type_cycles_through_codes() {
        let mut page = market_data_page();
        page.open_create();
        let form = page.form.as_mut().unwrap();
        form.selected_field = 2;
        form.cycle(true);
        assert_eq!(form.draft.asset_type, "BOND");
        form.cycle(false);
        form.cycle(false);
        assert_eq!(form.draft.asset_type, "COMMODITY");
    }

    #[test]
    fn delete_failure_keeps_rows() {
        let mut page = market_data_page();
        page.activate();
        page.on_response(
            Op::List,
            Ok(json!([{"id": 9, "symbol": "000001", "name": "平安银行",
                       "asset_type": "STOCK", "exchange": "SZSE"}])),
        );
        page.handle_key(KeyCode::Char('d'));
        assert_eq!(
            page.list.pending_delete.as_ref().map(|p| p.name.as_str()),
            Some("平安银行")
        );
        let out = page.handle_key(KeyCode::Enter);
        assert_eq!(out[0].1.path, "/market-data/9");

        let out = page.on_response(Op::Delete, Err(ApiError::status(500, "")));
        assert!(out.is_empty());
        assert_eq!(page.list.records.len(), 1);
        assert_eq!(page.list.notice.as_deref(), Some("删除失败"));
    }
}
