use criterion::{BenchmarkId, Criterion, Throughput, black_box, criterion_group, criterion_main};

use chrono::Utc;
use rust_decimal::Decimal;
use stockroom_core::{PageRequest, ProductId};
use stockroom_infra::InventoryService;
use stockroom_infra::product_store::InMemoryProductStore;
use stockroom_products::{CreateProduct, SellProduct};
use tokio::runtime::Runtime;

fn runtime() -> Runtime {
    tokio::runtime::Builder::new_current_thread()
        .build()
        .unwrap()
}

type BenchService = InventoryService<InMemoryProductStore>;

fn seeded_service(rt: &Runtime, products: usize, stock: i64) -> (BenchService, Vec<ProductId>) {
    let svc = InventoryService::new(InMemoryProductStore::new());
    let ids = rt.block_on(async {
        let mut ids = Vec::with_capacity(products);
        for i in 0..products {
            let product = svc
                .create_product(CreateProduct {
                    name: format!("bench-{i}"),
                    description: "benchmark product".to_string(),
                    price: Decimal::new(999, 2),
                    stock_level: stock,
                    occurred_at: Utc::now(),
                })
                .await
                .unwrap();
            ids.push(product.id_typed());
        }
        ids
    });
    (svc, ids)
}

fn bench_sale_throughput(c: &mut Criterion) {
    let rt = runtime();
    let mut group = c.benchmark_group("sale_throughput");
    group.throughput(Throughput::Elements(1));

    let (svc, ids) = seeded_service(&rt, 1, i64::MAX / 2);
    let id = ids[0];
    group.bench_function("sell_one_unit", |b| {
        b.iter(|| {
            rt.block_on(svc.sell(SellProduct {
                product_id: black_box(id),
                count: 1,
                occurred_at: Utc::now(),
            }))
            .unwrap()
        });
    });

    let (svc, ids) = seeded_service(&rt, 1, 0);
    let id = ids[0];
    group.bench_function("rejected_sale", |b| {
        b.iter(|| {
            let result = rt.block_on(svc.sell(SellProduct {
                product_id: black_box(id),
                count: 1,
                occurred_at: Utc::now(),
            }));
            assert!(result.is_err());
        });
    });

    group.finish();
}

fn bench_list_window(c: &mut Criterion) {
    let rt = runtime();
    let mut group = c.benchmark_group("list_window");

    for size in [100usize, 1_000, 10_000].iter() {
        let (svc, _) = seeded_service(&rt, *size, 10);
        group.bench_with_input(BenchmarkId::from_parameter(size), size, |b, _| {
            b.iter(|| {
                rt.block_on(svc.list_products(black_box(PageRequest::new(5, 20, 10))))
                    .unwrap()
            });
        });
    }

    group.finish();
}

criterion_group!(benches, bench_sale_throughput, bench_list_window);
criterion_main!(benches);
