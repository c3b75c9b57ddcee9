diesel::table! {
    clients (id) {
        id -> Text,
        broker_id -> Text,
        client_name -> Text,
        phone_no -> Text,
        email -> Text,
        address -> Text,
        account_open_date -> Timestamp,
        account_types -> Text,
        account_status -> Text,
        created_at -> Timestamp,
        updated_at -> Timestamp,
    }
}

diesel::table! {
    instruments (id) {
        id -> Text,
        name -> Text,
        code -> Text,
        exchange -> Text,
        segment -> Text,
        feed -> Text,
        cmp -> Text,
        created_at -> Timestamp,
        updated_at -> Timestamp,
    }
}

diesel::table! {
    holdings_lots (id) {
        id -> BigInt,
        client_id -> Text,
        instrument_id -> Text,
        buy_quantity -> Text,
        buy_price -> Text,
        buy_value -> Text,
        buy_date -> Timestamp,
        sell_quantity -> Text,
        sell_price -> Text,
        sell_value -> Text,
        sell_date -> Nullable<Timestamp>,
        open_quantity -> Text,
        unrealised_pnl -> Text,
        market_value -> Text,
        owned_by -> Text,
        fund_source -> Text,
        from_date -> Timestamp,
        to_date -> Timestamp,
    }
}

diesel::table! {
    ledger_entries (id) {
        id -> BigInt,
        client_id -> Text,
        amount -> Text,
        entry_kind -> Text,
        from_date -> Timestamp,
        to_date -> Timestamp,
    }
}

diesel::table! {
    invested_cash (id) {
        id -> BigInt,
        client_id -> Text,
        amount -> Text,
        from_date -> Timestamp,
        to_date -> Timestamp,
    }
}

diesel::table! {
    withdrawn_cash (client_id) {
        client_id -> Text,
        amount -> Text,
    }
}

diesel::table! {
    realised_pnl (id) {
        id -> BigInt,
        client_id -> Text,
        amount -> Text,
        entry_type -> Text,
        contributed_by -> Text,
        from_date -> Timestamp,
        to_date -> Timestamp,
    }
}

diesel::table! {
    current_ledger_balance (client_id) {
        client_id -> Text,
        amount -> Text,
    }
}

diesel::table! {
    today_algo_pnl (client_id) {
        client_id -> Text,
        amount -> Text,
    }
}

diesel::joinable!(holdings_lots -> clients (client_id));
diesel::joinable!(holdings_lots -> instruments (instrument_id));
diesel::joinable!(ledger_entries -> clients (client_id));
diesel::joinable!(invested_cash -> clients (client_id));
diesel::joinable!(realised_pnl -> clients (client_id));

diesel::allow_tables_to_appear_in_same_query!(
    clients,
    instruments,
    holdings_lots,
    ledger_entries,
    invested_cash,
    withdrawn_cash,
    realised_pnl,
    current_ledger_balance,
    today_algo_pnl,
);
